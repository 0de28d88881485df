//! Per-item acquisition rules.
//!
//! One pure function maps an ownership edge onto state mutations,
//! dispatched by the item's [`AcquirePolicy`]. The session tracker derives
//! the edges by diffing ownership snapshots against current state.

use crate::state::CooldownState;

use super::definitions::{AcquirePolicy, TrackedItem};

/// An ownership edge derived from consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipEvent {
    Acquired,
    Lost,
}

/// Apply one ownership edge to the state.
///
/// A duplicate acquire while a cooldown is already running must not
/// restart it: the timestamp is only written when none exists. Loss-driven
/// timestamps always write, since the loss itself is the usage signal.
pub fn apply(item: &TrackedItem, event: OwnershipEvent, state: &mut CooldownState, now: u64) {
    if item.policy == AcquirePolicy::StorageCounted {
        // Availability comes from the charge count, not ownership flags
        return;
    }

    match event {
        OwnershipEvent::Acquired => {
            state.set_owned(item.id, true);
            if item.policy == AcquirePolicy::TimestampOnAcquire && state.timestamp(item.id) == 0 {
                state.set_timestamp(item.id, now as i64);
            }
        }
        OwnershipEvent::Lost => {
            state.set_owned(item.id, false);
            if item.policy == AcquirePolicy::TimestampOnLoss {
                state.set_timestamp(item.id, now as i64);
            }
        }
    }
}
