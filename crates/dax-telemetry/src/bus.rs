//! Event bus with pluggable sinks.
//!
//! Events are queued on a `std::sync::mpsc` channel when emitted and
//! handed to the sinks on [`EventBus::flush`].

use std::sync::mpsc;

use crate::events::ExecutionEvent;
use crate::sinks::EventSink;

/// Queues execution events and dispatches them to registered sinks.
pub struct EventBus {
    sender: mpsc::Sender<ExecutionEvent>,
    receiver: mpsc::Receiver<ExecutionEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// An enabled bus with nothing attached.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Attaches a sink; it sees every event flushed from now on.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`EventBus::add_sink`].
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.add_sink(Box::new(sink));
        self
    }

    /// Turns event capture on or off. While off, `emit` discards events.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether `emit` currently queues events.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event. No-op if the bus is disabled.
    pub fn emit(&self, event: ExecutionEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as the bus.
        let _ = self.sender.send(event);
    }

    /// Dispatches all queued events to every sink, in emission order.
    /// Returns the number of events dispatched.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            count += 1;
        }
        count
    }

    /// Flushes pending events, then finalizes every sink.
    pub fn finalize(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Number of attached sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("enabled", &self.enabled)
            .finish()
    }
}
