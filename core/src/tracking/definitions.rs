//! Static definitions of the tracked key items.
//!
//! Definitions are the "template" side of tracking: which ids to watch,
//! what cooldown each carries, and which acquisition policy governs when
//! the cooldown starts. Runtime state lives in
//! [`CooldownState`](crate::state::CooldownState).

use crate::protocol::{STORAGE_REGEN_SECS, item_id};

/// How acquisition/loss events translate into cooldown state for an item.
///
/// Dispatched through a single table lookup; the per-item semantics differ
/// because the game only exposes some usages indirectly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquirePolicy {
    /// Acquiring starts the cooldown; losing the item does not restart it.
    TimestampOnAcquire,
    /// Acquiring only marks ownership. Losing the item starts the
    /// cooldown: loss is the observable proxy for "used".
    TimestampOnLoss,
    /// Acquiring only marks ownership. The cooldown starts solely when a
    /// zone-transit usage is detected.
    NoTimestampUntilUsed,
    /// Ownership and timestamp are not meaningful; availability derives
    /// from the storage charge count.
    StorageCounted,
}

/// Static definition of one tracked key item.
#[derive(Debug, Clone, Copy)]
pub struct TrackedItem {
    pub id: u16,
    pub name: &'static str,
    pub cooldown_secs: u64,
    pub policy: AcquirePolicy,
}

/// The fixed set of tracked items. Loaded once, never mutated.
pub const TRACKED_ITEMS: &[TrackedItem] = &[
    TrackedItem {
        id: item_id::CHRONAL_CELL,
        name: "Chronal Cell",
        cooldown_secs: STORAGE_REGEN_SECS,
        policy: AcquirePolicy::StorageCounted,
    },
    TrackedItem {
        id: item_id::SHIMMERING_PEARL,
        name: "Shimmering Pearl",
        cooldown_secs: 72_000,
        policy: AcquirePolicy::TimestampOnAcquire,
    },
    TrackedItem {
        id: item_id::SEAL_OF_THE_DEEP,
        name: "Seal of the Deep",
        cooldown_secs: 259_200,
        policy: AcquirePolicy::TimestampOnAcquire,
    },
    TrackedItem {
        id: item_id::ASHEN_IDOL,
        name: "Ashen Idol",
        cooldown_secs: 216_000,
        policy: AcquirePolicy::TimestampOnLoss,
    },
    TrackedItem {
        id: item_id::WAYFARERS_PRISM,
        name: "Wayfarer's Prism",
        cooldown_secs: 64_800,
        policy: AcquirePolicy::NoTimestampUntilUsed,
    },
    TrackedItem {
        id: item_id::DUSKWROUGHT_PHYLACTERY,
        name: "Duskwrought Phylactery",
        cooldown_secs: 302_400,
        policy: AcquirePolicy::TimestampOnAcquire,
    },
    TrackedItem {
        id: item_id::ECHO_CRYSTAL,
        name: "Echo Crystal",
        cooldown_secs: 57_600,
        policy: AcquirePolicy::TimestampOnLoss,
    },
];

/// Look up a tracked item definition by id.
pub fn item(id: u16) -> Option<&'static TrackedItem> {
    TRACKED_ITEMS.iter().find(|item| item.id == id)
}

pub fn is_tracked(id: u16) -> bool {
    item(id).is_some()
}
