//! Serial reference adapter.

use dax_types::{DaxResult, Element, Id};
use tracing::debug;

use crate::adapter::DeviceAdapter;
use crate::container::HostContainer;
use crate::error_handler::ErrorHandler;

/// Runs every invocation in index order on the calling thread.
///
/// Always available, used for:
/// - Debugging functors with a deterministic order
/// - Correctness validation (parallel results should match)
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceAdapterDebug;

impl DeviceAdapterDebug {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceAdapter for DeviceAdapterDebug {
    type Container<T: Element> = HostContainer<T>;

    fn name(&self) -> &'static str {
        "debug"
    }

    fn schedule<P, F>(&self, functor: F, parameters: &P, num_instances: Id) -> DaxResult<()>
    where
        P: Sync + ?Sized,
        F: Fn(&P, Id, &ErrorHandler) + Sync,
    {
        debug!(device = self.name(), num_instances, "schedule");
        let errors = ErrorHandler::new();
        for index in 0..num_instances {
            functor(parameters, index, &errors);
        }
        errors.into_result()
    }
}
