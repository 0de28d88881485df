//! Snapshot backups of the durable state file.
//!
//! Snapshots are plain copies named `<stem>_<UTC timestamp>.toml` so the
//! names sort lexicographically in creation order; retention and listing
//! never consult filesystem metadata. Backup failures are reported but
//! never block the primary save path.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;

use super::PersistenceError;
use super::store::state_file_stem;

/// Default seconds of process uptime between periodic snapshots.
pub const BACKUP_INTERVAL_SECS: u64 = 3_600;

/// Default number of snapshots kept per identity.
pub const BACKUP_RETENTION: usize = 24;

pub struct BackupRotator {
    backup_dir: PathBuf,
    interval: Duration,
    retention: usize,
    started: Instant,
    last_backup: Option<Instant>,
}

impl BackupRotator {
    pub fn new(backup_dir: PathBuf) -> Self {
        Self::with_limits(
            backup_dir,
            Duration::from_secs(BACKUP_INTERVAL_SECS),
            BACKUP_RETENTION,
        )
    }

    pub fn with_limits(backup_dir: PathBuf, interval: Duration, retention: usize) -> Self {
        Self {
            backup_dir,
            interval,
            retention,
            started: Instant::now(),
            last_backup: None,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Opportunistic periodic snapshot, called after each successful save.
    /// Never fails the caller.
    pub fn maybe_backup(&mut self, state_file: &Path, identity: Option<u32>) {
        let since = self.last_backup.unwrap_or(self.started);
        if since.elapsed() < self.interval {
            return;
        }
        match self.backup_now(state_file, identity, None) {
            Ok(path) => tracing::info!("[BACKUP] periodic snapshot {:?}", path),
            Err(e) => tracing::warn!("[BACKUP] periodic snapshot failed: {e}"),
        }
    }

    /// Copy the durable file into a timestamp-named snapshot and prune old
    /// ones. `tag` is appended after the timestamp (used for pre-restore
    /// safety copies).
    pub fn backup_now(
        &mut self,
        state_file: &Path,
        identity: Option<u32>,
        tag: Option<&str>,
    ) -> Result<PathBuf, PersistenceError> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| PersistenceError::Io {
            path: self.backup_dir.clone(),
            source: e,
        })?;

        let stem = state_file_stem(identity);
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let name = match tag {
            Some(tag) => format!("{stem}_{stamp}_{tag}.toml"),
            None => format!("{stem}_{stamp}.toml"),
        };
        let target = self.backup_dir.join(&name);

        fs::copy(state_file, &target).map_err(|e| PersistenceError::Io {
            path: state_file.to_path_buf(),
            source: e,
        })?;

        self.last_backup = Some(Instant::now());
        self.prune(&stem);
        Ok(target)
    }

    /// List snapshot names for an identity, oldest first.
    pub fn list_backups(&self, identity: Option<u32>) -> Vec<String> {
        self.snapshot_names(&state_file_stem(identity))
    }

    /// Swap a named snapshot in as the current durable file, preceded by a
    /// safety snapshot of the pre-restore file. The caller reloads state
    /// from disk afterwards.
    pub fn restore(
        &mut self,
        name: &str,
        state_file: &Path,
        identity: Option<u32>,
    ) -> Result<(), PersistenceError> {
        // Names are bare file names; reject anything path-like
        let source = self.backup_dir.join(name);
        if name.contains(['/', '\\']) || !source.is_file() {
            return Err(PersistenceError::UnknownBackup(name.to_string()));
        }

        if state_file.exists() {
            let safety = self.backup_now(state_file, identity, Some("prerestore"))?;
            tracing::info!("[BACKUP] pre-restore safety snapshot {:?}", safety);
        }

        fs::copy(&source, state_file).map_err(|e| PersistenceError::Io {
            path: source.clone(),
            source: e,
        })?;
        tracing::info!("[BACKUP] restored {:?} over {:?}", source, state_file);
        Ok(())
    }

    fn snapshot_names(&self, stem: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.backup_dir) else {
            return Vec::new();
        };
        let prefix = format!("{stem}_");
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix) && name.ends_with(".toml"))
            .collect();
        names.sort();
        names
    }

    /// Delete the lexicographically-oldest snapshots beyond the retention
    /// count.
    fn prune(&self, stem: &str) {
        let names = self.snapshot_names(stem);
        if names.len() <= self.retention {
            return;
        }
        for name in &names[..names.len() - self.retention] {
            let path = self.backup_dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!("[BACKUP] pruned {:?}", path),
                Err(e) => tracing::warn!("[BACKUP] failed to prune {:?}: {e}", path),
            }
        }
    }
}
