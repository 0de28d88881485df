//! Command implementations over the engine's public operations.

use std::path::PathBuf;
use std::sync::Arc;

use keywatch_core::capture::{CaptureFollower, read_capture};
use keywatch_core::session::unix_now;
use tokio::sync::RwLock;

use crate::app_state::AppState;
use crate::render;

pub async fn show_status(state: Arc<RwLock<AppState>>) {
    let snapshot = state.write().await.tracker.status(unix_now());
    render::print_status(&snapshot);
}

/// Process every frame in a capture file, then print the resulting status.
pub async fn feed_file(path: &str, state: Arc<RwLock<AppState>>) {
    let path = resolve_capture_path(path, &state).await;
    let records = match read_capture(&path) {
        Ok(records) => records,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    let count = records.len();
    {
        let mut s = state.write().await;
        let now = unix_now();
        for record in records {
            s.tracker.handle_frame(record.opcode, &record.payload, now);
        }
    }
    println!("Processed {count} frames from {}", path.display());
    show_status(state).await;
}

/// Tail a capture file, processing frames as they are appended.
pub async fn follow_file(path: &str, state: Arc<RwLock<AppState>>) {
    let path = resolve_capture_path(path, &state).await;
    let mut follower = match CaptureFollower::open(&path) {
        Ok(follower) => follower,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    println!("Following {} (existing frames are skipped)", path.display());

    let follow_state = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        while let Some(record) = follower.next_frame().await {
            let mut s = follow_state.write().await;
            s.tracker
                .handle_frame(record.opcode, &record.payload, unix_now());
        }
    });

    let mut s = state.write().await;
    if let Some(previous) = s.follow_task.replace(handle) {
        previous.abort();
    }
}

pub async fn set_timestamp(id: u16, time: i64, state: Arc<RwLock<AppState>>) {
    let mut s = state.write().await;
    s.tracker.force_set_timestamp(id, time);
    println!("Timestamp for {id} set to {time}");
}

pub async fn set_timebank(secs: i64, state: Arc<RwLock<AppState>>) {
    let mut s = state.write().await;
    s.tracker.force_set_time_bank(secs);
    println!("Time bank set to {secs}s");
}

pub async fn save(state: Arc<RwLock<AppState>>) {
    let mut s = state.write().await;
    match s.tracker.save() {
        Ok(true) => println!("Saved to {}", s.tracker.state_file().display()),
        Ok(false) => println!("Save suppressed: state holds no meaningful data yet"),
        Err(e) => println!("Save failed: {e}"),
    }
}

pub async fn backup(state: Arc<RwLock<AppState>>) {
    let mut s = state.write().await;
    match s.tracker.backup_now() {
        Ok(path) => println!("Backup written to {}", path.display()),
        Err(e) => println!("Backup failed: {e}"),
    }
}

pub async fn list_backups(state: Arc<RwLock<AppState>>) {
    let s = state.read().await;
    let names = s.tracker.list_backups();
    if names.is_empty() {
        println!("No backups in {}", s.tracker.backup_dir().display());
        return;
    }
    for name in names {
        println!("{name}");
    }
}

pub async fn restore(name: &str, state: Arc<RwLock<AppState>>) {
    let mut s = state.write().await;
    match s.tracker.restore_backup(name, unix_now()) {
        Ok(()) => println!("Restored {name}"),
        Err(e) => println!("Restore failed: {e}"),
    }
}

/// Switch (or clear) the player identity and remember it in the config.
pub async fn set_identity(identity: Option<u32>, state: Arc<RwLock<AppState>>) {
    let mut s = state.write().await;
    s.tracker.set_identity(identity, unix_now());
    s.config.identity = identity;
    s.store_config();
    match identity {
        Some(id) => println!("Identity set to {id}"),
        None => println!("Identity cleared (shared state file)"),
    }
}

pub async fn show_settings(state: Arc<RwLock<AppState>>) {
    let s = state.read().await;
    println!("identity:     {:?}", s.config.identity);
    println!("state file:   {}", s.tracker.state_file().display());
    println!("backups:      {}", s.tracker.backup_dir().display());
    println!("capture file: {:?}", s.config.capture_file);
}

pub fn exit() {
    println!("Exiting");
}

/// Empty path argument falls back to the configured capture file.
async fn resolve_capture_path(path: &str, state: &Arc<RwLock<AppState>>) -> PathBuf {
    if !path.is_empty() {
        return PathBuf::from(path);
    }
    state
        .read()
        .await
        .config
        .capture_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(path))
}
