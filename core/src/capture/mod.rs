//! Capture-file frame source.
//!
//! Outside the game host, frames are fed from a capture file: a flat
//! stream of `[u16 LE opcode][u16 LE length][payload]` records. This
//! module only handles record framing; decoding stays in
//! [`frames`](crate::frames).

mod follower;
mod scanner;

use std::path::PathBuf;

use thiserror::Error;

pub use follower::CaptureFollower;
pub use scanner::{FrameScanner, MAX_RECORD_SIZE, RawFrame, encode_record, read_capture};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("watch error on {path:?}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
