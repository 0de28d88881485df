//! Pure storage for the tracked cooldown state.
//! Routing logic lives in the session tracker; the rules module decides
//! which fields an event touches.

use hashbrown::HashMap;

use crate::protocol::{STORAGE_MAX, STORAGE_REGEN_SECS};
use crate::tracking::{self, AcquirePolicy};

/// A time-bank reading older than this is discarded on load as stale.
pub const TIME_BANK_STALE_SECS: u64 = 604_800;

/// The persisted aggregate: everything keywatch knows about one player
/// identity.
///
/// All time fields are unix seconds; 0 means "never observed". Fields are
/// only reset to 0 by an identity change or explicit stale-data detection,
/// never by normal event flow.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    /// Item id -> unix time the cooldown started (absent/0 = never)
    timestamps: HashMap<u16, u64>,
    /// Item id -> currently-held flag
    owned: HashMap<u16, bool>,
    /// Charges of the storage-counted consumable, 0..=3
    storage_count: u8,
    /// Unix time the current regeneration cycle began (0 = inactive)
    storage_timer: u64,
    /// Unix time of the last gated-zone entry (0 = never)
    gated_zone_entry_time: u64,
    /// Precomputed entry + 60h. Stored rather than recomputed so that
    /// time-bank consumption adjusts one value without a second source of
    /// truth.
    gated_zone_ready_time: u64,
    /// Stored time credit in seconds
    time_bank_value: u64,
    /// Unix time the credit was last confirmed from the event stream
    time_bank_observed_at: u64,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Timestamps / ownership ---

    /// Cooldown start for `id` (0 = never observed).
    pub fn timestamp(&self, id: u16) -> u64 {
        self.timestamps.get(&id).copied().unwrap_or(0)
    }

    /// Set a cooldown start. Unknown item ids are ignored; negative values
    /// clamp to 0.
    pub fn set_timestamp(&mut self, id: u16, secs: i64) {
        if !tracking::is_tracked(id) {
            tracing::trace!("[STATE] ignoring timestamp for untracked item {id}");
            return;
        }
        self.timestamps.insert(id, secs.max(0) as u64);
    }

    pub fn owned(&self, id: u16) -> bool {
        self.owned.get(&id).copied().unwrap_or(false)
    }

    /// Set the held flag. Unknown item ids are ignored.
    pub fn set_owned(&mut self, id: u16, held: bool) {
        if !tracking::is_tracked(id) {
            tracing::trace!("[STATE] ignoring ownership for untracked item {id}");
            return;
        }
        self.owned.insert(id, held);
    }

    pub fn timestamps(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.timestamps.iter().map(|(&id, &t)| (id, t))
    }

    pub fn owned_entries(&self) -> impl Iterator<Item = (u16, bool)> + '_ {
        self.owned.iter().map(|(&id, &held)| (id, held))
    }

    // --- Derived reads ---

    /// Seconds until `id` is ready, or `None` when no cooldown start has
    /// been observed (distinct from `Some(0)` = ready).
    pub fn remaining_at(&self, id: u16, now: u64) -> Option<u64> {
        let item = tracking::item(id)?;
        if item.policy == AcquirePolicy::StorageCounted {
            return None;
        }
        let started = self.timestamp(id);
        if started == 0 {
            return None;
        }
        Some((started + item.cooldown_secs).saturating_sub(now))
    }

    /// Whether `id` is known to be off cooldown. An item never observed is
    /// not available.
    pub fn is_available_at(&self, id: u16, now: u64) -> bool {
        let Some(item) = tracking::item(id) else {
            return false;
        };
        if item.policy == AcquirePolicy::StorageCounted {
            return self.storage_count > 0;
        }
        self.remaining_at(id, now) == Some(0)
    }

    /// Any nonzero timestamp or held item. The persistence guard refuses
    /// to overwrite a good file with a state that has neither.
    pub fn has_meaningful_data(&self) -> bool {
        self.timestamps.values().any(|&t| t > 0) || self.owned.values().any(|&held| held)
    }

    // --- Storage charges ---

    pub fn storage_count(&self) -> u8 {
        self.storage_count
    }

    pub fn storage_timer(&self) -> u64 {
        self.storage_timer
    }

    pub fn set_storage(&mut self, count: u8, timer: u64) {
        self.storage_count = count.min(STORAGE_MAX);
        self.storage_timer = timer;
    }

    /// Apply an authoritative charge-count reading from the stream.
    /// Returns true when any field changed.
    ///
    /// The count is never bumped locally when a cycle elapses; the next
    /// reading from the stream is authoritative. The timer only tracks the
    /// running cycle for display.
    pub fn observe_storage_count(&mut self, count: u8, now: u64) -> bool {
        let count = count.min(STORAGE_MAX);
        let mut changed = false;
        if count != self.storage_count {
            self.storage_count = count;
            changed = true;
        }
        if self.storage_count >= STORAGE_MAX {
            if self.storage_timer != 0 {
                self.storage_timer = 0;
                changed = true;
            }
        } else if self.storage_timer == 0 {
            self.storage_timer = now;
            changed = true;
        }
        changed
    }

    /// Seconds until the next charge regenerates; `None` when full or when
    /// no cycle has been observed.
    pub fn storage_regen_remaining_at(&self, now: u64) -> Option<u64> {
        if self.storage_count >= STORAGE_MAX || self.storage_timer == 0 {
            return None;
        }
        Some((self.storage_timer + STORAGE_REGEN_SECS).saturating_sub(now))
    }

    // --- Gated zone ---

    pub fn gated_zone_entry_time(&self) -> u64 {
        self.gated_zone_entry_time
    }

    pub fn gated_zone_ready_time(&self) -> u64 {
        self.gated_zone_ready_time
    }

    /// Set the gated-zone pair, clamping so ready never precedes entry.
    pub fn set_gated_zone(&mut self, entry_time: u64, ready_time: u64) {
        self.gated_zone_entry_time = entry_time;
        self.gated_zone_ready_time = if entry_time > 0 {
            ready_time.max(entry_time)
        } else {
            ready_time
        };
    }

    /// Seconds until the gated zone group can be re-entered (0 when ready
    /// or never entered).
    pub fn gated_remaining_at(&self, now: u64) -> u64 {
        if self.gated_zone_ready_time == 0 {
            return 0;
        }
        self.gated_zone_ready_time.saturating_sub(now)
    }

    // --- Time bank ---

    pub fn time_bank_value(&self) -> u64 {
        self.time_bank_value
    }

    pub fn time_bank_observed_at(&self) -> u64 {
        self.time_bank_observed_at
    }

    /// Set the stored credit directly (manual correction). Negative values
    /// clamp to 0; the observation time is left untouched.
    pub fn set_time_bank(&mut self, secs: i64) {
        self.time_bank_value = secs.max(0) as u64;
    }

    /// Apply a credit reading from the event stream.
    pub fn observe_time_bank(&mut self, value: u32, now: u64) {
        self.time_bank_value = value as u64;
        self.time_bank_observed_at = now;
    }

    /// Deduct credit consumed at a gated-zone entry. Local deduction, not
    /// an observation: the observed-at time is left untouched.
    pub fn consume_time_bank(&mut self, secs: u64) {
        self.time_bank_value = self.time_bank_value.saturating_sub(secs);
    }

    /// Explicit stale-data detection: drop a time-bank reading that has
    /// not been confirmed for [`TIME_BANK_STALE_SECS`].
    pub fn clear_stale(&mut self, now: u64) {
        if self.time_bank_observed_at > 0
            && now.saturating_sub(self.time_bank_observed_at) > TIME_BANK_STALE_SECS
        {
            tracing::info!(
                "[STATE] discarding stale time-bank reading ({}s, observed at {})",
                self.time_bank_value,
                self.time_bank_observed_at
            );
            self.time_bank_value = 0;
            self.time_bank_observed_at = 0;
        }
    }
}
