//! The tracker context object.
//!
//! Owns all mutable engine state (cooldown state, zone pair, signal bus,
//! identity, persistence plumbing) and is passed explicitly to callers; no
//! ambient singletons. One frame is processed at a time from the host's
//! dispatch loop, so in-order handling is the only synchronization needed.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use keywatch_types::StatusSnapshot;

use crate::events::{GameSignal, SignalBus, SignalHandler};
use crate::frames::{GameFrame, decode_frame};
use crate::persistence::{self, BackupRotator, PersistenceError};
use crate::query::StatusCache;
use crate::signal_processor::ZoneTracker;
use crate::state::CooldownState;
use crate::tracking::{self, OwnershipEvent, TRACKED_ITEMS};

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Default data directory (`<platform data dir>/keywatch`).
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("keywatch"))
}

pub struct Tracker {
    data_dir: PathBuf,
    identity: Option<u32>,
    state: CooldownState,
    zones: ZoneTracker,
    bus: SignalBus,
    rotator: BackupRotator,
    status_cache: StatusCache,
    /// True once state has been (re)loaded from disk for the current
    /// identity; gates the empty-state save refusal.
    initial_load_done: bool,
    /// Bumped on every state mutation; invalidates the status cache.
    generation: u64,
}

impl Tracker {
    /// Create a tracker with all-zero state and no identity. State is
    /// loaded when an identity (or explicitly no identity) is set.
    pub fn new(data_dir: PathBuf) -> Self {
        let rotator = BackupRotator::new(data_dir.join("backups"));
        Self {
            data_dir,
            identity: None,
            state: CooldownState::new(),
            zones: ZoneTracker::new(),
            bus: SignalBus::new(),
            rotator,
            status_cache: StatusCache::new(),
            initial_load_done: false,
            generation: 0,
        }
    }

    pub fn identity(&self) -> Option<u32> {
        self.identity
    }

    pub fn state_file(&self) -> PathBuf {
        persistence::state_file_path(&self.data_dir, self.identity)
    }

    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        handler: Box<dyn SignalHandler + Send + Sync>,
    ) {
        self.bus.subscribe(name, handler);
    }

    // --- Identity lifecycle ---

    /// Switch to a player identity (or the shared no-identity namespace),
    /// resetting in-memory state and reloading it from the identity's
    /// durable file. A repeated set of the current identity is a no-op.
    pub fn set_identity(&mut self, identity: Option<u32>, now: u64) {
        if self.identity == identity && self.initial_load_done {
            return;
        }
        self.identity = identity;
        self.state = CooldownState::new();
        let path = self.state_file();
        self.state = persistence::load(&path);
        self.state.clear_stale(now);
        self.initial_load_done = true;
        self.generation += 1;
        tracing::info!(
            "[SESSION] identity {:?}, state loaded from {:?}",
            identity,
            path
        );
    }

    /// Forced identity-cache invalidation (logout imminent). Flushes a
    /// final save, then drops the identity and resets state; the reset is
    /// atomic with respect to event processing, so later frames only ever
    /// see the fully-reset default state.
    fn invalidate_identity(&mut self) {
        self.maybe_save();
        tracing::info!("[SESSION] identity {:?} invalidated by logout", self.identity);
        self.identity = None;
        self.state = CooldownState::new();
        self.initial_load_done = false;
        self.generation += 1;
    }

    // --- Frame processing ---

    /// Entry point for the host dispatch loop: decode one frame, apply it,
    /// notify subscribers, and persist when something changed.
    pub fn handle_frame(&mut self, opcode: u16, payload: &[u8], now: u64) {
        let mut signals: Vec<GameSignal> = Vec::new();
        let mut mutated = false;

        match decode_frame(opcode, payload) {
            GameFrame::ItemOwnershipSnapshot(snapshot) => {
                for item in TRACKED_ITEMS {
                    let Some(held) = snapshot.held(item.id) else {
                        continue;
                    };
                    if held == self.state.owned(item.id) {
                        continue;
                    }
                    let event = if held {
                        OwnershipEvent::Acquired
                    } else {
                        OwnershipEvent::Lost
                    };
                    tracking::apply(item, event, &mut self.state, now);
                    mutated = true;
                    signals.push(match event {
                        OwnershipEvent::Acquired => GameSignal::ItemAcquired {
                            item_id: item.id,
                            timestamp: now,
                        },
                        OwnershipEvent::Lost => GameSignal::ItemLost {
                            item_id: item.id,
                            timestamp: now,
                        },
                    });
                }
            }
            GameFrame::ZoneChanged { zone_id } => {
                let zone_signals = self.zones.observe(zone_id, &mut self.state, now);
                mutated = zone_signals.iter().any(|signal| {
                    matches!(
                        signal,
                        GameSignal::GatedZoneEntered { .. } | GameSignal::TransitItemUsed { .. }
                    )
                });
                signals.extend(zone_signals);
            }
            GameFrame::TimeCreditObserved {
                actor_id,
                message_id,
                value,
            } => {
                tracing::debug!(
                    "[FRAME] time credit {value}s (actor {actor_id}, message {message_id})"
                );
                self.state.observe_time_bank(value, now);
                mutated = true;
            }
            GameFrame::StorageCountObserved { count } => {
                mutated = self.state.observe_storage_count(count, now);
            }
            GameFrame::LogoutImminent { countdown } => {
                tracing::debug!("[FRAME] logout countdown {countdown}");
                if countdown <= 1 {
                    self.invalidate_identity();
                }
            }
            GameFrame::Unrecognized => {
                tracing::trace!(
                    "[FRAME] unrecognized opcode {opcode:#06x} ({} bytes)",
                    payload.len()
                );
            }
        }

        for signal in &signals {
            self.bus.dispatch(signal);
        }

        if mutated {
            self.generation += 1;
            self.maybe_save();
        }
    }

    // --- Persistence operations ---

    /// Save after a mutation. Guard rejections are deliberate no-ops; I/O
    /// failures degrade to a log line and in-memory state stays
    /// authoritative.
    fn maybe_save(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!("[PERSIST] save failed: {e}");
        }
    }

    /// Explicit save. Returns `Ok(false)` when the guard suppressed the
    /// write.
    pub fn save(&mut self) -> Result<bool, PersistenceError> {
        let doc = persistence::to_table(&self.state);
        if !persistence::guard::should_save(&doc, self.initial_load_done) {
            return Ok(false);
        }
        let path = self.state_file();
        persistence::save_table(&path, &doc)?;
        self.rotator.maybe_backup(&path, self.identity);
        Ok(true)
    }

    /// Manual snapshot of the durable file.
    pub fn backup_now(&mut self) -> Result<PathBuf, PersistenceError> {
        let path = self.state_file();
        self.rotator.backup_now(&path, self.identity, None)
    }

    pub fn list_backups(&self) -> Vec<String> {
        self.rotator.list_backups(self.identity)
    }

    /// Swap a named backup in as current state (a safety snapshot of the
    /// pre-restore file is taken first), then reload from disk.
    pub fn restore_backup(&mut self, name: &str, now: u64) -> Result<(), PersistenceError> {
        let path = self.state_file();
        self.rotator.restore(name, &path, self.identity)?;
        self.state = persistence::load(&path);
        self.state.clear_stale(now);
        self.initial_load_done = true;
        self.generation += 1;
        Ok(())
    }

    pub fn backup_dir(&self) -> &Path {
        self.rotator.backup_dir()
    }

    // --- Manual corrections ---

    /// Force a cooldown start (correction for a missed frame). Unknown ids
    /// are ignored, negative times clamp to 0.
    pub fn force_set_timestamp(&mut self, id: u16, secs: i64) {
        self.state.set_timestamp(id, secs);
        self.generation += 1;
        self.maybe_save();
    }

    /// Force the stored time credit (correction for a missed frame).
    pub fn force_set_time_bank(&mut self, secs: i64) {
        self.state.set_time_bank(secs);
        self.generation += 1;
        self.maybe_save();
    }

    // --- Read queries ---

    pub fn timestamp(&self, id: u16) -> u64 {
        self.state.timestamp(id)
    }

    pub fn owned(&self, id: u16) -> bool {
        self.state.owned(id)
    }

    pub fn remaining(&self, id: u16, now: u64) -> Option<u64> {
        self.state.remaining_at(id, now)
    }

    pub fn is_available(&self, id: u16, now: u64) -> bool {
        self.state.is_available_at(id, now)
    }

    pub fn storage_count(&self) -> u8 {
        self.state.storage_count()
    }

    pub fn storage_regen_remaining(&self, now: u64) -> Option<u64> {
        self.state.storage_regen_remaining_at(now)
    }

    pub fn gated_zone_entry_time(&self) -> u64 {
        self.state.gated_zone_entry_time()
    }

    pub fn gated_remaining(&self, now: u64) -> u64 {
        self.state.gated_remaining_at(now)
    }

    pub fn time_bank(&self) -> (u64, u64) {
        (
            self.state.time_bank_value(),
            self.state.time_bank_observed_at(),
        )
    }

    pub fn current_zone(&self) -> Option<u16> {
        self.zones.current()
    }

    /// Display snapshot, served through the sub-second cache.
    pub fn status(&mut self, now: u64) -> StatusSnapshot {
        self.status_cache
            .snapshot(&self.state, self.generation, now)
    }
}
