//! The device adapter contract.

use dax_types::{DaxResult, Element, Id};

use crate::container::ArrayContainerExecution;
use crate::error_handler::ErrorHandler;

/// Trait for execution backends.
///
/// An adapter is a small, cheaply cloned handle. Algorithms are generic
/// over it and monomorphized per adapter.
///
/// # Implementations
/// - [`DeviceAdapterDebug`](crate::DeviceAdapterDebug): Sequential reference
/// - [`DeviceAdapterThreaded`](crate::DeviceAdapterThreaded): rayon parallel-for
/// - [`DeviceAdapterKernel`](crate::DeviceAdapterKernel): Block/thread launch grid
pub trait DeviceAdapter: Clone + Send + Sync + 'static {
    /// Execution-side storage for arrays of `T` on this device.
    type Container<T: Element>: ArrayContainerExecution<T>;

    /// Returns the adapter name (e.g., "debug", "threaded").
    fn name(&self) -> &'static str;

    /// Returns true if execution arrays live in a memory space separate
    /// from the control side, so every transfer is a real copy.
    fn separate_memory_space(&self) -> bool {
        false
    }

    /// Invokes `functor(parameters, index, errors)` once for every `index`
    /// in `0..num_instances`.
    ///
    /// Invocations run in no guaranteed order and may run concurrently.
    /// Returns after every invocation has completed. If any invocation
    /// raised an error, the first raised message is returned as
    /// [`DaxError::Execution`](dax_types::DaxError::Execution).
    fn schedule<P, F>(&self, functor: F, parameters: &P, num_instances: Id) -> DaxResult<()>
    where
        P: Sync + ?Sized,
        F: Fn(&P, Id, &ErrorHandler) + Sync;
}
