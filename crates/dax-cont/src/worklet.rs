//! The worklet contract.

use dax_device::ErrorHandler;
use dax_types::Domain;

/// A per-instance algorithm, run once for every index of its domain.
///
/// `Values` is the tuple of argument values in the order the arguments
/// were passed to [`Scheduler::invoke`](crate::Scheduler::invoke). Input
/// values arrive filled in; output values start at their default and are
/// stored back after `execute` returns.
///
/// Worklets must not depend on invocation order or on other instances.
pub trait Worklet: Sync {
    /// Domain whose length sets the number of instances.
    const DOMAIN: Domain;

    type Values;

    /// Runs one instance. Errors are reported through `errors`; other
    /// instances keep running.
    fn execute(&self, values: &mut Self::Values, errors: &ErrorHandler);
}
