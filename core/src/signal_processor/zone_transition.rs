//! Zone transition state machine.
//!
//! Tracks (previous, current) zone ids and recognizes two compound events
//! from the transition pair:
//! - lobby -> gated zone: restarts the shared 60h re-entry timer, consuming
//!   time credit when a cooldown was still running
//! - staging -> destination: implicit usage of the owned transit item
//!
//! Duplicate zone reports are suppressed; the pair survives until process
//! restart.

use crate::events::GameSignal;
use crate::protocol::{
    GATED_ENTRIES, GATED_ZONE_COOLDOWN_SECS, TRANSIT_DESTINATIONS, TRANSIT_ITEM_ID,
    TRANSIT_STAGING_ZONE,
};
use crate::state::CooldownState;

#[derive(Debug, Clone, Default)]
pub struct ZoneTracker {
    previous: Option<u16>,
    current: Option<u16>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<u16> {
        self.previous
    }

    pub fn current(&self) -> Option<u16> {
        self.current
    }

    /// Advance the state machine with a zone report.
    ///
    /// Returns the signals for this transition, ending with `ZoneChanged`;
    /// empty for a duplicate report.
    pub fn observe(
        &mut self,
        zone_id: u16,
        state: &mut CooldownState,
        now: u64,
    ) -> Vec<GameSignal> {
        if self.current == Some(zone_id) {
            return Vec::new();
        }
        self.previous = self.current;
        self.current = Some(zone_id);

        let mut signals = Vec::new();
        if let Some(prev) = self.previous {
            if GATED_ENTRIES.get(&prev) == Some(&zone_id) {
                signals.push(self.enter_gated_zone(zone_id, state, now));
            }
            if prev == TRANSIT_STAGING_ZONE
                && TRANSIT_DESTINATIONS.contains(&zone_id)
                && state.owned(TRANSIT_ITEM_ID)
            {
                tracing::info!("[ZONE] transit item {TRANSIT_ITEM_ID} used via {prev} -> {zone_id}");
                state.set_owned(TRANSIT_ITEM_ID, false);
                state.set_timestamp(TRANSIT_ITEM_ID, now as i64);
                signals.push(GameSignal::TransitItemUsed {
                    item_id: TRANSIT_ITEM_ID,
                    timestamp: now,
                });
            }
        }

        signals.push(GameSignal::ZoneChanged {
            zone_id,
            timestamp: now,
        });
        signals
    }

    /// A lobby -> gated transition. Entry always restarts the timer; a
    /// still-running cooldown means stored time credit was consumed to
    /// bypass it, so the bank is reduced by the time that was left.
    fn enter_gated_zone(
        &self,
        zone_id: u16,
        state: &mut CooldownState,
        now: u64,
    ) -> GameSignal {
        // Remaining cooldown from the state *before* it is overwritten
        let existing_remaining = state.gated_remaining_at(now);
        let consumed = existing_remaining.min(state.time_bank_value());
        if consumed > 0 {
            state.consume_time_bank(consumed);
            tracing::info!(
                "[ZONE] gated entry bypassed {existing_remaining}s of cooldown, consumed {consumed}s of credit"
            );
        }

        state.set_gated_zone(now, now + GATED_ZONE_COOLDOWN_SECS);
        tracing::info!("[ZONE] gated zone {zone_id} entered at {now}");

        GameSignal::GatedZoneEntered {
            zone_id,
            entry_time: now,
            bank_consumed: consumed,
        }
    }
}
