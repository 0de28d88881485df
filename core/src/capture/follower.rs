//! Live tail of a growing capture file.
//!
//! A filesystem watcher nudges a reader task whenever the file changes; a
//! coarse interval tick covers editors and filesystems that coalesce or
//! drop events. New bytes are fed through the record scanner and whole
//! frames are handed to the consumer over a channel.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::scanner::{FrameScanner, RawFrame};
use super::CaptureError;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct CaptureFollower {
    frames: mpsc::UnboundedReceiver<RawFrame>,
    // Watching stops when the follower is dropped
    _watcher: notify::RecommendedWatcher,
    reader: tokio::task::JoinHandle<()>,
}

impl CaptureFollower {
    /// Start following `path`. The file must already exist; frames
    /// appended after the current end of file are delivered in order.
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let start_offset = std::fs::metadata(path)
            .map_err(|e| CaptureError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        let (nudge_tx, mut nudge_rx) = mpsc::unbounded_channel::<()>();
        let mut watcher =
            notify::recommended_watcher(move |result: Result<notify::Event, notify::Error>| {
                if result.is_ok() {
                    let _ = nudge_tx.send(());
                }
            })
            .map_err(|e| CaptureError::Watch {
                path: path.to_path_buf(),
                source: e,
            })?;
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| CaptureError::Watch {
                path: path.to_path_buf(),
                source: e,
            })?;

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let file_path = path.to_path_buf();
        let reader = tokio::spawn(async move {
            let mut scanner = FrameScanner::new();
            let mut offset = start_offset;
            let mut tick = tokio::time::interval(POLL_INTERVAL);
            loop {
                tokio::select! {
                    _ = nudge_rx.recv() => {}
                    _ = tick.tick() => {}
                }
                match read_new_bytes(&file_path, &mut offset) {
                    Ok(bytes) if !bytes.is_empty() => {
                        scanner.push(&bytes);
                        loop {
                            let before = scanner.pending();
                            match scanner.next_frame() {
                                Some(frame) => {
                                    if frame_tx.send(frame).is_err() {
                                        return;
                                    }
                                }
                                // Stop once neither a frame nor a resync
                                // drop made progress
                                None if scanner.pending() == before => break,
                                None => {}
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("[CAPTURE] read failed on {:?}: {e}", file_path);
                    }
                }
            }
        });

        Ok(Self {
            frames: frame_rx,
            _watcher: watcher,
            reader,
        })
    }

    /// Next appended frame; `None` once the reader task has stopped.
    pub async fn next_frame(&mut self) -> Option<RawFrame> {
        self.frames.recv().await
    }
}

impl Drop for CaptureFollower {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Read everything past `offset`, handling truncation by starting over.
fn read_new_bytes(path: &Path, offset: &mut u64) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len < *offset {
        tracing::info!("[CAPTURE] {:?} truncated, rereading from start", path);
        *offset = 0;
    }
    if len == *offset {
        return Ok(Vec::new());
    }
    file.seek(SeekFrom::Start(*offset))?;
    let mut bytes = Vec::with_capacity((len - *offset) as usize);
    file.read_to_end(&mut bytes)?;
    *offset = len;
    Ok(bytes)
}
