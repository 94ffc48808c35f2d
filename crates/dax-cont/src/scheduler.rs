//! Worklet scheduling.
//!
//! [`Scheduler::invoke`] turns a worklet plus a tuple of control-side
//! arguments into exactly one device schedule:
//! 1. Arguments agree on the domain length (checked before any transfer).
//! 2. Each argument prepares its execution view.
//! 3. The device runs one instance per index.
//! 4. On success, written arguments copy back; on failure, nothing does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use dax_device::{DeviceAdapter, ErrorHandler};
use dax_telemetry::{EventBus, EventKind, ExecutionEvent, TransferDirection};
use dax_types::{DaxResult, Id};
use tracing::{debug, warn};

use crate::arg::{ArgumentList, ExecList};
use crate::worklet::Worklet;

/// Runs worklets on device `D`, optionally reporting to an [`EventBus`].
///
/// A scheduler can be shared between threads; each invocation takes its own
/// invocation number.
#[derive(Debug)]
pub struct Scheduler<D: DeviceAdapter> {
    device: D,
    events: Option<Mutex<EventBus>>,
    next_invocation: AtomicU64,
}

impl<D: DeviceAdapter> Scheduler<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            events: None,
            next_invocation: AtomicU64::new(0),
        }
    }

    /// Attaches an event bus that receives an event stream per invocation.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(Mutex::new(bus));
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn has_events(&self) -> bool {
        self.events.is_some()
    }

    /// The attached event bus, for flushing.
    pub fn events_mut(&mut self) -> Option<&mut EventBus> {
        self.events
            .as_mut()
            .map(|bus| bus.get_mut().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of invocations started so far, failed ones included.
    pub fn invocation_count(&self) -> u64 {
        self.next_invocation.load(Ordering::Relaxed)
    }

    fn begin_invocation(&self) -> u64 {
        self.next_invocation.fetch_add(1, Ordering::Relaxed)
    }

    fn emit(&self, invocation: u64, kind: EventKind) {
        if let Some(bus) = &self.events {
            bus.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .emit(ExecutionEvent::new(invocation, kind));
        }
    }

    fn emit_transfer(&self, invocation: u64, direction: TransferDirection, bytes: u64) {
        if bytes > 0 {
            self.emit(invocation, EventKind::Transfer { direction, bytes });
        }
    }

    fn fail(&self, invocation: u64, label: &str, error: &dax_types::DaxError) {
        warn!(device = self.device.name(), worklet = label, %error, "invocation failed");
        self.emit(
            invocation,
            EventKind::ScheduleFailed {
                message: error.to_string(),
            },
        );
    }

    fn run<P, F>(
        &self,
        invocation: u64,
        label: &str,
        functor: F,
        parameters: &P,
        num_instances: Id,
    ) -> DaxResult<()>
    where
        P: Sync + ?Sized,
        F: Fn(&P, Id, &ErrorHandler) + Sync,
    {
        self.emit(
            invocation,
            EventKind::ScheduleBegin {
                device: self.device.name().to_string(),
                worklet: label.to_string(),
                num_instances: num_instances as u64,
            },
        );
        let start = Instant::now();
        let result = self.device.schedule(functor, parameters, num_instances);
        match &result {
            Ok(()) => self.emit(
                invocation,
                EventKind::ScheduleEnd {
                    wall_time: start.elapsed().as_secs_f64(),
                },
            ),
            Err(error) => self.fail(invocation, label, error),
        }
        result
    }

    /// Schedules a raw functor on the device, with the same logging and
    /// events as a worklet invocation. `label` names it in both.
    pub fn schedule<P, F>(
        &self,
        label: &str,
        functor: F,
        parameters: &P,
        num_instances: Id,
    ) -> DaxResult<()>
    where
        P: Sync + ?Sized,
        F: Fn(&P, Id, &ErrorHandler) + Sync,
    {
        let invocation = self.begin_invocation();
        debug!(device = self.device.name(), label, num_instances, "schedule");
        self.run(invocation, label, functor, parameters, num_instances)
    }

    /// Runs `worklet` once per index of its domain over `args`.
    ///
    /// Fails with [`DomainMismatch`](dax_types::DaxError::DomainMismatch)
    /// before any transfer if the arguments disagree on the domain length,
    /// and with [`Execution`](dax_types::DaxError::Execution) if any
    /// instance raised an error. Output arguments are only updated on
    /// success.
    pub fn invoke<W, A>(&self, worklet: &W, mut args: A) -> DaxResult<()>
    where
        W: Worklet,
        A: ArgumentList<D, Values = W::Values>,
    {
        let invocation = self.begin_invocation();
        let label = short_type_name::<W>();

        let num_instances = match args.domain_length(W::DOMAIN) {
            Ok(length) => length,
            Err(error) => {
                self.fail(invocation, label, &error);
                return Err(error);
            }
        };
        debug!(
            device = self.device.name(),
            worklet = label,
            domain = %W::DOMAIN,
            num_instances,
            "preparing arguments"
        );

        let bytes_in = args.bytes_to_execution();
        let bytes_out = args.bytes_to_control(num_instances);
        let outcome = match args.prepare(num_instances) {
            Ok(exec) => {
                self.emit_transfer(invocation, TransferDirection::ToExecution, bytes_in);
                self.run(
                    invocation,
                    label,
                    |exec, index, errors| execute_instance(worklet, exec, index, errors),
                    &exec,
                    num_instances,
                )
            }
            Err(error) => {
                self.fail(invocation, label, &error);
                Err(error)
            }
        };

        match outcome {
            Ok(()) => {
                args.finish();
                self.emit_transfer(invocation, TransferDirection::ToControl, bytes_out);
                Ok(())
            }
            Err(error) => {
                args.abort();
                Err(error)
            }
        }
    }
}

impl<D: DeviceAdapter + Default> Default for Scheduler<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

fn execute_instance<W, E>(worklet: &W, exec: &E, index: Id, errors: &ErrorHandler)
where
    W: Worklet,
    E: ExecList<Values = W::Values>,
{
    match exec.fetch(index) {
        Ok(mut values) => {
            worklet.execute(&mut values, errors);
            // SAFETY: the device runs each index exactly once.
            unsafe { exec.store(index, &values) };
        }
        Err(error) => errors.raise_error(&error),
    }
}

/// Last path segment of a type name, for logs.
fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}
