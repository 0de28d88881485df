//! TOML (de)serialization of the cooldown state.
//!
//! Item-id maps are written as sub-tables with decimal string keys (TOML
//! table keys are strings). Reading coerces rather than fails: non-numeric
//! values read as 0, non-table values as empty maps, unknown item ids are
//! dropped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::protocol::GATED_ZONE_COOLDOWN_SECS;
use crate::state::CooldownState;

use super::PersistenceError;

/// File stem used when no identity is known.
const SHARED_STEM: &str = "keywatch_shared";

/// Durable-state file name for an identity.
pub fn state_file_name(identity: Option<u32>) -> String {
    match identity {
        Some(id) => format!("keywatch_{id}.toml"),
        None => format!("{SHARED_STEM}.toml"),
    }
}

/// File stem (name without extension) for an identity; backup snapshot
/// names build on this.
pub fn state_file_stem(identity: Option<u32>) -> String {
    match identity {
        Some(id) => format!("keywatch_{id}"),
        None => SHARED_STEM.to_string(),
    }
}

pub fn state_file_path(data_dir: &Path, identity: Option<u32>) -> PathBuf {
    data_dir.join(state_file_name(identity))
}

/// Serialize the state into a TOML table.
pub fn to_table(state: &CooldownState) -> Table {
    let mut timestamps = Table::new();
    for (id, t) in state.timestamps().collect::<BTreeMap<_, _>>() {
        timestamps.insert(id.to_string(), Value::Integer(t as i64));
    }

    let mut owned = Table::new();
    for (id, held) in state.owned_entries().collect::<BTreeMap<_, _>>() {
        owned.insert(id.to_string(), Value::Boolean(held));
    }

    let mut root = Table::new();
    root.insert("timestamps".into(), Value::Table(timestamps));
    root.insert("owned".into(), Value::Table(owned));
    root.insert(
        "storage_count".into(),
        Value::Integer(state.storage_count() as i64),
    );
    root.insert(
        "storage_timer".into(),
        Value::Integer(state.storage_timer() as i64),
    );
    root.insert(
        "gated_zone_entry_time".into(),
        Value::Integer(state.gated_zone_entry_time() as i64),
    );
    root.insert(
        "gated_zone_ready_time".into(),
        Value::Integer(state.gated_zone_ready_time() as i64),
    );
    root.insert(
        "time_bank_value".into(),
        Value::Integer(state.time_bank_value() as i64),
    );
    root.insert(
        "time_bank_observed_at".into(),
        Value::Integer(state.time_bank_observed_at() as i64),
    );
    root
}

fn int_field(table: &Table, key: &str) -> u64 {
    table
        .get(key)
        .and_then(Value::as_integer)
        .unwrap_or(0)
        .max(0) as u64
}

/// Rebuild state from a TOML table, merging field by field against
/// defaults.
///
/// Also migrates older files that predate the stored ready time by
/// deriving it from the entry time.
pub fn from_table(table: &Table) -> CooldownState {
    let mut state = CooldownState::new();

    if let Some(timestamps) = table.get("timestamps").and_then(Value::as_table) {
        for (key, value) in timestamps {
            if let Ok(id) = key.parse::<u16>() {
                state.set_timestamp(id, value.as_integer().unwrap_or(0));
            }
        }
    }

    if let Some(owned) = table.get("owned").and_then(Value::as_table) {
        for (key, value) in owned {
            if let Ok(id) = key.parse::<u16>() {
                state.set_owned(id, value.as_bool().unwrap_or(false));
            }
        }
    }

    state.set_storage(
        int_field(table, "storage_count").min(u8::MAX as u64) as u8,
        int_field(table, "storage_timer"),
    );

    let entry_time = int_field(table, "gated_zone_entry_time");
    let mut ready_time = int_field(table, "gated_zone_ready_time");
    if ready_time == 0 && entry_time > 0 {
        // Migration: older files stored only the entry time
        ready_time = entry_time + GATED_ZONE_COOLDOWN_SECS;
        tracing::info!("[PERSIST] migrated gated-zone ready time from entry time {entry_time}");
    }
    state.set_gated_zone(entry_time, ready_time);

    let bank = int_field(table, "time_bank_value").min(u32::MAX as u64);
    let observed = int_field(table, "time_bank_observed_at");
    if observed > 0 {
        state.observe_time_bank(bank as u32, observed);
    } else {
        state.set_time_bank(bank as i64);
    }

    state
}

/// Load state from the durable file.
///
/// Never fails: a missing file reads as defaults, unreadable or unparsable
/// content falls back to defaults with a loud log line.
pub fn load(path: &Path) -> CooldownState {
    if !path.exists() {
        tracing::info!("[PERSIST] no state file at {:?}, starting fresh", path);
        return CooldownState::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("[PERSIST] failed to read {:?}: {e}, starting fresh", path);
            return CooldownState::new();
        }
    };

    match toml::from_str::<Table>(&contents) {
        Ok(table) => from_table(&table),
        Err(e) => {
            tracing::error!(
                "[PERSIST] unparsable state file {:?}: {e}; falling back to defaults",
                path
            );
            CooldownState::new()
        }
    }
}

/// Write a serialized state table to the durable file.
pub fn save_table(path: &Path, table: &Table) -> Result<(), PersistenceError> {
    let contents = toml::to_string_pretty(table).map_err(|e| PersistenceError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, contents).map_err(|e| PersistenceError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
