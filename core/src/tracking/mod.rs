//! Tracked item definitions and acquisition rules.

pub mod definitions;
pub mod rules;

pub use definitions::{AcquirePolicy, TRACKED_ITEMS, TrackedItem, is_tracked, item};
pub use rules::{OwnershipEvent, apply};
