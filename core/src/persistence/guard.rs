//! Save guard.
//!
//! A best-effort corruption heuristic, not a transactional guarantee: a
//! transient decode failure or a bug upstream that rebuilt the state wrong
//! must not silently erase a previously-good file by writing an empty
//! default over it. A state that legitimately has nothing to record on
//! first real use is indistinguishable from a corrupted read and is held
//! back too; the first meaningful value unblocks all subsequent saves.

use toml::{Table, Value};

/// Decide whether a serialized state table is safe to write.
pub fn should_save(doc: &Table, has_completed_initial_load: bool) -> bool {
    // Structural check: both maps must be present as tables. Their absence
    // means the document was not built from a real state.
    let Some(timestamps) = doc.get("timestamps").and_then(Value::as_table) else {
        tracing::warn!("[PERSIST] save refused: timestamps table missing from document");
        return false;
    };
    let Some(owned) = doc.get("owned").and_then(Value::as_table) else {
        tracing::warn!("[PERSIST] save refused: owned table missing from document");
        return false;
    };

    let any_timestamp = timestamps
        .values()
        .any(|v| v.as_integer().unwrap_or(0) > 0);
    let any_owned = owned.values().any(|v| v.as_bool().unwrap_or(false));

    if !any_timestamp && !any_owned && has_completed_initial_load {
        tracing::debug!("[PERSIST] save suppressed: no meaningful data after initial load");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::to_table;
    use crate::protocol::item_id;
    use crate::state::CooldownState;

    #[test]
    fn test_refuses_structurally_absent_maps() {
        let doc = Table::new();
        assert!(!should_save(&doc, false));
        assert!(!should_save(&doc, true));

        let doc: Table = toml::from_str("timestamps = 5\nowned = 5").unwrap();
        assert!(!should_save(&doc, true));
    }

    #[test]
    fn test_refuses_empty_state_after_initial_load() {
        let doc = to_table(&CooldownState::new());
        assert!(!should_save(&doc, true));
    }

    #[test]
    fn test_allows_empty_state_before_initial_load() {
        let doc = to_table(&CooldownState::new());
        assert!(should_save(&doc, false));
    }

    #[test]
    fn test_one_meaningful_value_unblocks_saves() {
        let mut state = CooldownState::new();
        state.set_timestamp(item_id::SHIMMERING_PEARL, 1_000);
        assert!(should_save(&to_table(&state), true));

        let mut state = CooldownState::new();
        state.set_owned(item_id::ASHEN_IDOL, true);
        assert!(should_save(&to_table(&state), true));
    }

    #[test]
    fn test_zeroed_entries_are_not_meaningful() {
        let mut state = CooldownState::new();
        state.set_timestamp(item_id::SHIMMERING_PEARL, 0);
        state.set_owned(item_id::ASHEN_IDOL, false);
        assert!(!should_save(&to_table(&state), true));
    }
}
