//! Tests for the zone transition state machine.

use crate::events::GameSignal;
use crate::protocol::{GATED_ZONE_COOLDOWN_SECS, TRANSIT_ITEM_ID};
use crate::state::CooldownState;

use super::ZoneTracker;

#[test]
fn test_duplicate_zone_reports_are_suppressed() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();

    let first = zones.observe(230, &mut state, 1_000);
    assert_eq!(first.len(), 1);
    assert!(matches!(
        first[0],
        GameSignal::ZoneChanged { zone_id: 230, .. }
    ));

    let duplicate = zones.observe(230, &mut state, 1_005);
    assert!(duplicate.is_empty());
    assert_eq!(zones.current(), Some(230));
    assert_eq!(zones.previous(), None);
}

#[test]
fn test_pair_shifts_on_transition() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();

    zones.observe(100, &mut state, 10);
    zones.observe(101, &mut state, 20);
    assert_eq!(zones.previous(), Some(100));
    assert_eq!(zones.current(), Some(101));
}

#[test]
fn test_gated_entry_without_prior_cooldown() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();
    state.set_time_bank(20_000);

    zones.observe(230, &mut state, 1_000);
    let signals = zones.observe(294, &mut state, 2_000);

    assert_eq!(state.gated_zone_entry_time(), 2_000);
    assert_eq!(
        state.gated_zone_ready_time(),
        2_000 + GATED_ZONE_COOLDOWN_SECS
    );
    // No cooldown was running, so no credit is consumed
    assert_eq!(state.time_bank_value(), 20_000);

    assert_eq!(signals.len(), 2);
    assert!(matches!(
        signals[0],
        GameSignal::GatedZoneEntered {
            zone_id: 294,
            entry_time: 2_000,
            bank_consumed: 0,
        }
    ));
    assert!(matches!(
        signals[1],
        GameSignal::ZoneChanged { zone_id: 294, .. }
    ));
}

#[test]
fn test_gated_entry_consumes_time_bank() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();

    // 5000s of cooldown left at the transition time
    state.set_gated_zone(1_000, 7_000);
    state.set_time_bank(20_000);

    zones.observe(230, &mut state, 1_500);
    let signals = zones.observe(294, &mut state, 2_000);

    assert_eq!(state.time_bank_value(), 15_000);
    assert_eq!(state.gated_zone_entry_time(), 2_000);
    assert_eq!(
        state.gated_zone_ready_time(),
        2_000 + GATED_ZONE_COOLDOWN_SECS
    );
    assert!(matches!(
        signals[0],
        GameSignal::GatedZoneEntered {
            bank_consumed: 5_000,
            ..
        }
    ));
}

#[test]
fn test_gated_entry_consumption_is_capped_by_bank() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();

    state.set_gated_zone(1_000, 50_000);
    state.set_time_bank(3_000);

    zones.observe(236, &mut state, 1_500);
    zones.observe(294, &mut state, 2_000);

    // consumed = min(bank, remaining) = 3000
    assert_eq!(state.time_bank_value(), 0);
    assert_eq!(state.gated_zone_entry_time(), 2_000);
}

#[test]
fn test_gated_entry_requires_matching_pair() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();

    // Entering the gated zone from a non-lobby zone is not an entry event
    zones.observe(100, &mut state, 1_000);
    let signals = zones.observe(294, &mut state, 2_000);
    assert_eq!(signals.len(), 1);
    assert_eq!(state.gated_zone_entry_time(), 0);
}

#[test]
fn test_transit_usage_consumes_owned_item() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();
    state.set_owned(TRANSIT_ITEM_ID, true);

    zones.observe(202, &mut state, 1_000);
    let signals = zones.observe(214, &mut state, 2_000);

    assert!(!state.owned(TRANSIT_ITEM_ID));
    assert_eq!(state.timestamp(TRANSIT_ITEM_ID), 2_000);
    assert!(matches!(
        signals[0],
        GameSignal::TransitItemUsed {
            item_id: TRANSIT_ITEM_ID,
            timestamp: 2_000,
        }
    ));
}

#[test]
fn test_transit_without_item_is_plain_move() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();

    zones.observe(202, &mut state, 1_000);
    let signals = zones.observe(214, &mut state, 2_000);

    assert_eq!(signals.len(), 1);
    assert_eq!(state.timestamp(TRANSIT_ITEM_ID), 0);
}

#[test]
fn test_transit_requires_staging_origin() {
    let mut zones = ZoneTracker::new();
    let mut state = CooldownState::new();
    state.set_owned(TRANSIT_ITEM_ID, true);

    zones.observe(100, &mut state, 1_000);
    zones.observe(214, &mut state, 2_000);

    assert!(state.owned(TRANSIT_ITEM_ID));
    assert_eq!(state.timestamp(TRANSIT_ITEM_ID), 0);
}
