//! Execution event types.
//!
//! Events are small value types tagged with the invocation they belong
//! to. Every scheduler invocation gets a fresh, increasing id.

use serde::{Deserialize, Serialize};

/// An event emitted while running a worklet invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Scheduler invocation id (0-indexed).
    pub invocation: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Direction of a control/execution transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    ToExecution,
    ToControl,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Arguments are prepared and the device is about to run.
    ScheduleBegin {
        /// Device adapter name.
        device: String,
        /// Worklet type name.
        worklet: String,
        /// Number of scheduled instances.
        num_instances: u64,
    },

    /// Every instance ran without error. Emitted before results are
    /// copied back to control storage.
    ScheduleEnd {
        /// Wall-clock time of the device schedule alone (seconds).
        wall_time: f64,
    },

    /// The invocation failed. Nothing was copied back.
    ScheduleFailed {
        message: String,
    },

    /// Argument data crossed the control/execution boundary.
    Transfer {
        direction: TransferDirection,
        bytes: u64,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl ExecutionEvent {
    /// Creates a new event for the given invocation.
    pub fn new(invocation: u64, kind: EventKind) -> Self {
        Self { invocation, kind }
    }

    /// Returns true for `ScheduleFailed`.
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::ScheduleFailed { .. })
    }
}
