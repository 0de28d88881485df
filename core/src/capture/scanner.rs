//! Incremental record scanner for capture files.
//!
//! Records are `<u16 opcode><u16 length><payload>`, all little-endian. The
//! scanner can be fed arbitrary chunks and yields whole records when
//! available; an implausible length drops one byte and rescans so a
//! corrupt stretch cannot wedge the stream.

use std::fs;
use std::path::Path;

use super::CaptureError;

/// Upper bound on a record payload; anything larger is treated as
/// corruption.
pub const MAX_RECORD_SIZE: usize = 4_096;

const HEADER_LEN: usize = 4;

/// One undecoded capture record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub opcode: u16,
    pub payload: Vec<u8>,
}

/// Encode one record in capture-file framing.
pub fn encode_record(opcode: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&opcode.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

#[derive(Debug, Default)]
pub struct FrameScanner {
    buf: Vec<u8>,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes currently buffered (a trailing partial record at end of
    /// stream shows up here).
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Extract the next complete record, or `None` when more bytes are
    /// needed. On an implausible length the leading byte is dropped
    /// (resynchronization attempt) and `None` is returned for this round.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        if self.buf.len() < HEADER_LEN {
            return None;
        }
        let opcode = u16::from_le_bytes([self.buf[0], self.buf[1]]);
        let len = u16::from_le_bytes([self.buf[2], self.buf[3]]) as usize;

        if len > MAX_RECORD_SIZE {
            tracing::warn!("[CAPTURE] implausible record length {len}, resyncing");
            self.buf.drain(..1);
            return None;
        }
        if self.buf.len() < HEADER_LEN + len {
            return None;
        }

        let payload = self.buf[HEADER_LEN..HEADER_LEN + len].to_vec();
        self.buf.drain(..HEADER_LEN + len);
        Some(RawFrame { opcode, payload })
    }
}

/// Read every complete record from a capture file.
pub fn read_capture(path: &Path) -> Result<Vec<RawFrame>, CaptureError> {
    let bytes = fs::read(path).map_err(|e| CaptureError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut scanner = FrameScanner::new();
    scanner.push(&bytes);

    let mut records = Vec::new();
    let mut last_pending = scanner.pending();
    loop {
        match scanner.next_frame() {
            Some(record) => records.push(record),
            None => {
                // next_frame may have dropped a byte to resync; only stop
                // once the buffer stops shrinking
                if scanner.pending() == last_pending {
                    break;
                }
            }
        }
        last_pending = scanner.pending();
    }

    if scanner.pending() > 0 {
        tracing::warn!(
            "[CAPTURE] {} trailing bytes in {:?} (truncated record?)",
            scanner.pending(),
            path
        );
    }
    Ok(records)
}
