pub mod capture;
pub mod events;
pub mod frames;
pub mod persistence;
pub mod protocol;
pub mod query;
pub mod session;
pub mod signal_processor;
pub mod state;
pub mod tracking;

// Re-exports for convenience
pub use events::{GameSignal, SignalBus, SignalHandler};
pub use frames::{GameFrame, decode_frame};
pub use session::{Tracker, unix_now};
pub use state::CooldownState;
