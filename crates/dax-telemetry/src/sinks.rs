//! Pluggable event sinks.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;

use crate::events::{EventKind, ExecutionEvent};

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &ExecutionEvent);

    /// Called when the bus is finalized.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory for tests and inspection.
///
/// Clones share the same storage, so a test can keep one clone and hand
/// the other to the bus.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<ExecutionEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event received so far.
    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &ExecutionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing`. Failures are always logged at WARN;
/// other events at the configured level (TRACE, DEBUG, or INFO).
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &ExecutionEvent) {
        if let EventKind::ScheduleFailed { message } = &event.kind {
            tracing::warn!(invocation = event.invocation, %message, "execution_event");
            return;
        }
        if self.level == Level::TRACE {
            tracing::trace!(invocation = event.invocation, event = ?event.kind, "execution_event");
        } else if self.level == Level::DEBUG {
            tracing::debug!(invocation = event.invocation, event = ?event.kind, "execution_event");
        } else {
            tracing::info!(invocation = event.invocation, event = ?event.kind, "execution_event");
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
