//! Read-only status queries for renderers.
//!
//! Snapshots are derived data only; the cooldown state stays the single
//! source of truth. A short-lived cache absorbs high-frequency poll loops
//! and is invalidated by both its TTL and the tracker's mutation counter.

use std::time::{Duration, Instant};

use keywatch_types::{
    Availability, GatedStatus, ItemStatus, StatusSnapshot, StorageStatus, TimeBankStatus,
};

use crate::protocol::STORAGE_MAX;
use crate::state::CooldownState;
use crate::tracking::{AcquirePolicy, TRACKED_ITEMS};

/// How long a cached snapshot may be served.
pub const STATUS_CACHE_TTL: Duration = Duration::from_millis(250);

/// Build a fresh display snapshot from the state.
pub fn build_snapshot(state: &CooldownState, now: u64) -> StatusSnapshot {
    let items = TRACKED_ITEMS
        .iter()
        .map(|item| {
            let (availability, remaining) = match item.policy {
                AcquirePolicy::StorageCounted => {
                    if state.storage_count() > 0 {
                        (Availability::Ready, None)
                    } else if state.storage_timer() > 0 {
                        (Availability::OnCooldown, state.storage_regen_remaining_at(now))
                    } else {
                        (Availability::Unknown, None)
                    }
                }
                _ => match state.remaining_at(item.id, now) {
                    None => (Availability::Unknown, None),
                    Some(0) => (Availability::Ready, Some(0)),
                    Some(secs) => (Availability::OnCooldown, Some(secs)),
                },
            };
            ItemStatus {
                id: item.id,
                name: item.name.to_string(),
                owned: state.owned(item.id),
                availability,
                remaining_secs: remaining,
                cooldown_secs: item.cooldown_secs,
            }
        })
        .collect();

    StatusSnapshot {
        items,
        storage: StorageStatus {
            count: state.storage_count(),
            max: STORAGE_MAX,
            regen_remaining_secs: state.storage_regen_remaining_at(now),
        },
        gated: GatedStatus {
            entry_time: state.gated_zone_entry_time(),
            ready_time: state.gated_zone_ready_time(),
            remaining_secs: state.gated_remaining_at(now),
        },
        time_bank: TimeBankStatus {
            value_secs: state.time_bank_value(),
            observed_at: state.time_bank_observed_at(),
        },
    }
}

/// Sub-second snapshot cache keyed on the tracker's mutation counter.
#[derive(Default)]
pub struct StatusCache {
    cached: Option<(u64, Instant, StatusSnapshot)>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a cached snapshot when it is fresh and the state has not
    /// mutated; rebuild otherwise.
    pub fn snapshot(&mut self, state: &CooldownState, generation: u64, now: u64) -> StatusSnapshot {
        if let Some((cached_generation, built_at, snapshot)) = &self.cached
            && *cached_generation == generation
            && built_at.elapsed() < STATUS_CACHE_TTL
        {
            return snapshot.clone();
        }
        let snapshot = build_snapshot(state, now);
        self.cached = Some((generation, Instant::now(), snapshot.clone()));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::item_id;

    #[test]
    fn test_snapshot_distinguishes_unknown_ready_cooldown() {
        let mut state = CooldownState::new();
        state.set_timestamp(item_id::SHIMMERING_PEARL, 1_000); // 72000s cooldown
        state.set_timestamp(item_id::ECHO_CRYSTAL, 1_000); // 57600s cooldown

        let snapshot = build_snapshot(&state, 60_000);
        let by_id = |id: u16| {
            snapshot
                .items
                .iter()
                .find(|item| item.id == id)
                .unwrap()
                .clone()
        };

        let pearl = by_id(item_id::SHIMMERING_PEARL);
        assert_eq!(pearl.availability, Availability::OnCooldown);
        assert_eq!(pearl.remaining_secs, Some(13_000));

        let crystal = by_id(item_id::ECHO_CRYSTAL);
        assert_eq!(crystal.availability, Availability::Ready);
        assert_eq!(crystal.remaining_secs, Some(0));

        let idol = by_id(item_id::ASHEN_IDOL);
        assert_eq!(idol.availability, Availability::Unknown);
        assert_eq!(idol.remaining_secs, None);
    }

    #[test]
    fn test_snapshot_storage_row() {
        let mut state = CooldownState::new();
        let snapshot = build_snapshot(&state, 0);
        let cell = snapshot
            .items
            .iter()
            .find(|item| item.id == item_id::CHRONAL_CELL)
            .unwrap();
        assert_eq!(cell.availability, Availability::Unknown);

        state.observe_storage_count(0, 1_000);
        let snapshot = build_snapshot(&state, 2_000);
        let cell = snapshot
            .items
            .iter()
            .find(|item| item.id == item_id::CHRONAL_CELL)
            .unwrap();
        assert_eq!(cell.availability, Availability::OnCooldown);
        assert_eq!(snapshot.storage.regen_remaining_secs, Some(20_600));

        state.observe_storage_count(2, 3_000);
        let snapshot = build_snapshot(&state, 3_000);
        let cell = snapshot
            .items
            .iter()
            .find(|item| item.id == item_id::CHRONAL_CELL)
            .unwrap();
        assert_eq!(cell.availability, Availability::Ready);
    }

    #[test]
    fn test_cache_invalidated_by_generation() {
        let mut state = CooldownState::new();
        let mut cache = StatusCache::new();

        let first = cache.snapshot(&state, 1, 1_000);
        assert_eq!(first.time_bank.value_secs, 0);

        // Same generation: cached copy, even though state changed behind it
        state.set_time_bank(500);
        let stale = cache.snapshot(&state, 1, 1_000);
        assert_eq!(stale.time_bank.value_secs, 0);

        // Bumped generation: rebuilt
        let fresh = cache.snapshot(&state, 2, 1_000);
        assert_eq!(fresh.time_bank.value_secs, 500);
    }
}
