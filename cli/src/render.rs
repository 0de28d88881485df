//! Plain-text rendering of status snapshots and signal notifications.

use keywatch_core::events::{GameSignal, SignalHandler};
use keywatch_types::formatting::{format_countdown, format_remaining};
use keywatch_types::{Availability, StatusSnapshot};

/// Render a unix timestamp as local time, or a dash for "never".
pub fn format_unix(ts: u64) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    match chrono::DateTime::from_timestamp(ts as i64, 0) {
        Some(utc) => utc
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

fn availability_cell(availability: Availability, remaining: Option<u64>) -> String {
    match availability {
        Availability::Unknown => "unknown".to_string(),
        Availability::Ready => "READY".to_string(),
        Availability::OnCooldown => format_remaining(remaining.unwrap_or(0)),
    }
}

/// Print the full status table.
pub fn print_status(snapshot: &StatusSnapshot) {
    println!("{:<24} {:<6} {:<14}", "Item", "Held", "Status");
    println!("{}", "-".repeat(46));
    for item in &snapshot.items {
        println!(
            "{:<24} {:<6} {:<14}",
            item.name,
            if item.owned { "yes" } else { "no" },
            availability_cell(item.availability, item.remaining_secs),
        );
    }
    println!();

    println!(
        "Storage charges: {}/{}{}",
        snapshot.storage.count,
        snapshot.storage.max,
        match snapshot.storage.regen_remaining_secs {
            Some(secs) => format!(" (next in {})", format_remaining(secs)),
            None => String::new(),
        }
    );
    println!(
        "Gated zone: entered {} | {}",
        format_unix(snapshot.gated.entry_time),
        format_countdown(snapshot.gated.remaining_secs, "re-entry READY"),
    );
    println!(
        "Time bank: {}{}",
        format_remaining(snapshot.time_bank.value_secs),
        if snapshot.time_bank.observed_at > 0 {
            format!(" (observed {})", format_unix(snapshot.time_bank.observed_at))
        } else {
            String::new()
        }
    );
}

/// Bus subscriber that prints one-line notifications for zone events.
pub struct NoticePrinter;

impl SignalHandler for NoticePrinter {
    fn handle_signal(&mut self, signal: &GameSignal) {
        match signal {
            GameSignal::ZoneChanged { zone_id, .. } => {
                println!("* zone {zone_id}");
            }
            GameSignal::GatedZoneEntered {
                zone_id,
                bank_consumed,
                ..
            } => {
                if *bank_consumed > 0 {
                    println!(
                        "* gated zone {zone_id} entered, {} of time credit consumed",
                        format_remaining(*bank_consumed)
                    );
                } else {
                    println!("* gated zone {zone_id} entered, 60h timer restarted");
                }
            }
            GameSignal::TransitItemUsed { item_id, .. } => {
                println!("* transit item {item_id} consumed");
            }
            GameSignal::ItemAcquired { item_id, .. } => {
                println!("* item {item_id} acquired");
            }
            GameSignal::ItemLost { item_id, .. } => {
                println!("* item {item_id} lost");
            }
        }
    }
}
