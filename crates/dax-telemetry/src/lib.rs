//! # dax-telemetry
//!
//! Event bus for execution telemetry. The scheduler emits structured
//! events (schedule begin/end, failures, transfers) that are consumed by
//! pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, ExecutionEvent, TransferDirection};
pub use sinks::{EventSink, TracingSink, VecSink};
