use std::path::PathBuf;

use keywatch_core::session::{Tracker, default_data_dir, unix_now};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// Everything the command loop mutates: the engine context plus cli
/// configuration and the optional live-follow task.
pub struct AppState {
    pub tracker: Tracker,
    pub config: AppConfig,
    pub follow_task: Option<JoinHandle<()>>,
}

impl AppState {
    pub fn new() -> Self {
        let config: AppConfig = confy::load("keywatch", None).unwrap_or_default();
        let data_dir = config
            .data_dir
            .clone()
            .or_else(default_data_dir)
            .unwrap_or_else(|| PathBuf::from("keywatch-data"));

        let mut tracker = Tracker::new(data_dir);
        tracker.set_identity(config.identity, unix_now());

        Self {
            tracker,
            config,
            follow_task: None,
        }
    }

    /// Persist the cli configuration.
    pub fn store_config(&self) {
        if let Err(e) = confy::store("keywatch", None, &self.config) {
            tracing::warn!("failed to store config: {e}");
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Override for the state/backup directory (platform default if unset)
    pub data_dir: Option<PathBuf>,
    /// Player identity used to namespace the durable state file
    pub identity: Option<u32>,
    /// Capture file opened by `feed` when no path is given
    pub capture_file: Option<PathBuf>,
}
