//! Session context: the owned engine object and its public operations.

mod tracker;

#[cfg(test)]
mod tracker_tests;

pub use tracker::{Tracker, default_data_dir, unix_now};
