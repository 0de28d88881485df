/// Signals emitted by the tracker for cross-cutting concerns.
/// These represent "interesting things that happened" at a higher level
/// than raw frames.
#[derive(Debug, Clone)]
pub enum GameSignal {
    /// The player moved to a different zone (duplicates suppressed)
    ZoneChanged { zone_id: u16, timestamp: u64 },

    /// A lobby -> gated transition restarted the shared re-entry timer
    GatedZoneEntered {
        zone_id: u16,
        entry_time: u64,
        /// Seconds of time credit consumed to bypass a running cooldown
        bank_consumed: u64,
    },

    /// The transit item was consumed by a staging -> destination move
    TransitItemUsed { item_id: u16, timestamp: u64 },

    // Ownership edges derived from snapshot diffs
    ItemAcquired { item_id: u16, timestamp: u64 },
    ItemLost { item_id: u16, timestamp: u64 },
}
