//! Read-only status rows consumed by renderers.
//!
//! These are plain data snapshots produced by the engine's query layer.
//! Renderers receive them by value and hold no reference back into engine
//! state.

use serde::{Deserialize, Serialize};

/// Availability of a tracked item.
///
/// `Unknown` is distinct from `Ready`: an item whose cooldown start has
/// never been observed must not display as available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No cooldown start has been observed for this item
    #[default]
    Unknown,
    /// Cooldown observed and elapsed
    Ready,
    /// Cooldown observed and still running
    OnCooldown,
}

/// Display row for a single tracked item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatus {
    pub id: u16,
    pub name: String,
    pub owned: bool,
    pub availability: Availability,
    /// Seconds until the item is ready; `None` when availability is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    /// Configured cooldown duration in seconds
    pub cooldown_secs: u64,
}

/// Display summary for the charge-counted consumable
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StorageStatus {
    pub count: u8,
    pub max: u8,
    /// Seconds until the next charge regenerates; `None` when full or when
    /// no regeneration cycle has been observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regen_remaining_secs: Option<u64>,
}

/// Display summary for the gated-zone re-entry cooldown
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GatedStatus {
    /// Unix time of the last gated-zone entry (0 = never observed)
    pub entry_time: u64,
    /// Unix time the zone group becomes enterable again (0 = never observed)
    pub ready_time: u64,
    /// Seconds until re-entry is possible (0 when ready or never observed)
    pub remaining_secs: u64,
}

/// Display summary for the stored time credit
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimeBankStatus {
    /// Stored credit in seconds
    pub value_secs: u64,
    /// Unix time the value was last confirmed from the event stream
    /// (0 = never observed)
    pub observed_at: u64,
}

/// Complete read-only snapshot handed to renderers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub items: Vec<ItemStatus>,
    pub storage: StorageStatus,
    pub gated: GatedStatus,
    pub time_bank: TimeBankStatus,
}
