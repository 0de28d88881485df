//! Frame decoding.
//!
//! Turns raw byte buffers tagged with a host opcode into typed events.
//! Decoding is pure and total: malformed or short buffers decode to
//! [`GameFrame::Unrecognized`] instead of failing the caller.

pub mod bits;
mod decode;

pub use decode::{GameFrame, OwnershipSnapshot, decode_frame};
