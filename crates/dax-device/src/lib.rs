//! # dax-device
//!
//! Device adapters and execution-side array containers.
//!
//! A [`DeviceAdapter`] runs a functor once per logical index and owns the
//! container type used for execution-side arrays. Three adapters are
//! provided:
//! - [`DeviceAdapterDebug`]: Strict sequential loop (always available)
//! - [`DeviceAdapterThreaded`]: Parallel-for on a rayon thread pool
//! - [`DeviceAdapterKernel`]: Kernel-launch model with a separate memory
//!   space reached only through explicit transfers
//!
//! The same algorithm code runs on every adapter without changes.
//! [`DefaultDeviceAdapter`] is chosen at build time with the `threaded`
//! and `kernel` cargo features.

pub mod adapter;
pub mod config;
pub mod container;
pub mod debug;
pub mod error_handler;
pub mod kernel;
pub mod threaded;

pub use adapter::DeviceAdapter;
pub use config::DeviceConfig;
pub use container::{
    ArrayContainerExecution, DeviceContainer, ExecutionArray, HostContainer, TransferStats,
};
pub use debug::DeviceAdapterDebug;
pub use error_handler::ErrorHandler;
pub use kernel::{DeviceAdapterKernel, LaunchDimensions};
pub use threaded::DeviceAdapterThreaded;

/// Device adapter selected by cargo features.
#[cfg(feature = "kernel")]
pub type DefaultDeviceAdapter = DeviceAdapterKernel;

/// Device adapter selected by cargo features.
#[cfg(all(feature = "threaded", not(feature = "kernel")))]
pub type DefaultDeviceAdapter = DeviceAdapterThreaded;

/// Device adapter selected by cargo features.
#[cfg(not(any(feature = "threaded", feature = "kernel")))]
pub type DefaultDeviceAdapter = DeviceAdapterDebug;
