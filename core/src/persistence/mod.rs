//! Durable storage for the cooldown state.
//!
//! The state file is a plain TOML document, namespaced per player
//! identity. Loading is tolerant by design: a missing or unreadable file
//! falls back to defaults, and a structurally-partial document is merged
//! field by field. Saving goes through a guard that refuses to overwrite a
//! good file with an obviously-empty state.

pub mod backup;
pub mod guard;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use backup::BackupRotator;
pub use store::{load, save_table, state_file_name, state_file_path, to_table};

/// Errors from the durable store and backup paths.
///
/// Read failures never surface through this type; loading recovers locally
/// with a default state. Write failures do, so callers can report them,
/// but in-memory state stays authoritative regardless.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("no backup named {0:?}")]
    UnknownBackup(String),
}
