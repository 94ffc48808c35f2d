//! # dax-bench
//!
//! Benchmark suite for the Dax execution layer.
//!
//! Provides procedural scenarios (topology extraction and a per-cell
//! field map over every grid kind), a runner that times them on any
//! device adapter, and CSV export for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{GridKind, Scenario, Workload};
