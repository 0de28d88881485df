//! Signal fan-out with per-subscriber fault isolation.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{GameSignal, SignalHandler};

struct Subscriber {
    name: String,
    handler: Box<dyn SignalHandler + Send + Sync>,
}

/// Dispatches signals to registered subscribers (rendering, notifications).
///
/// Each dispatch is individually isolated: a panicking subscriber is logged
/// and skipped, the remaining subscribers and the caller proceed normally.
#[derive(Default)]
pub struct SignalBus {
    subscribers: Vec<Subscriber>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        handler: Box<dyn SignalHandler + Send + Sync>,
    ) {
        self.subscribers.push(Subscriber {
            name: name.into(),
            handler,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn dispatch(&mut self, signal: &GameSignal) {
        for sub in &mut self.subscribers {
            let outcome = catch_unwind(AssertUnwindSafe(|| sub.handler.handle_signal(signal)));
            if outcome.is_err() {
                tracing::error!(
                    "[SIGNAL] subscriber '{}' panicked handling {:?}",
                    sub.name,
                    signal
                );
            }
        }
    }
}
