pub mod bus;
pub mod handler;
pub mod signal;

pub use bus::SignalBus;
pub use handler::SignalHandler;
pub use signal::GameSignal;
