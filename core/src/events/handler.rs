use super::GameSignal;

/// A subscriber on the signal bus.
///
/// Handlers are invoked in subscription order for every dispatched signal.
/// Each invocation is fault-isolated by the bus: a handler that panics is
/// reported and skipped, and must not assume it can stop the dispatch.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &GameSignal);
}
