//! Stream compaction.

use std::marker::PhantomData;

use dax_device::{DeviceAdapter, ErrorHandler, ExecutionArray};
use dax_types::{DaxResult, Domain, Element, Id};

use crate::arg::Field;
use crate::array_handle::ArrayHandle;
use crate::scheduler::Scheduler;
use crate::worklet::Worklet;

/// Flags stencil entries that differ from `T::default()`.
struct FlagNonDefault<T>(PhantomData<fn(T)>);

impl<T: Element + PartialEq> Worklet for FlagNonDefault<T> {
    const DOMAIN: Domain = Domain::Point;
    type Values = (T, Id);

    fn execute(&self, (stencil, flag): &mut (T, Id), _errors: &ErrorHandler) {
        *flag = Id::from(*stencil != T::default());
    }
}

struct ScatterParameters<'a> {
    flags: ExecutionArray<'a, Id>,
    offsets: ExecutionArray<'a, Id>,
    output: ExecutionArray<'a, Id>,
}

fn scatter_index(params: &ScatterParameters<'_>, index: Id, _errors: &ErrorHandler) {
    if params.flags.get(index) != 0 {
        // SAFETY: offsets of flagged entries are distinct.
        unsafe { params.output.set(params.offsets.get(index), index) };
    }
}

/// Returns the indices of the entries of `stencil` that are not
/// `T::default()`, in increasing order.
///
/// Entries are flagged on the device, flags are scanned into output
/// offsets, and flagged indices are scattered to their offsets.
pub fn stream_compact<T, D>(
    scheduler: &Scheduler<D>,
    stencil: &mut ArrayHandle<T, D>,
) -> DaxResult<ArrayHandle<Id, D>>
where
    T: Element + PartialEq,
    D: DeviceAdapter,
{
    let mut flags = ArrayHandle::<Id, D>::new();
    scheduler.invoke(
        &FlagNonDefault::<T>(PhantomData),
        (Field::input(stencil), Field::output(&mut flags)),
    )?;

    let mut offsets = Vec::with_capacity(flags.len());
    let mut count: Id = 0;
    for &flag in flags.control_slice() {
        offsets.push(count);
        count += flag;
    }
    let mut offsets = ArrayHandle::<Id, D>::from_vec(offsets);

    let mut output = ArrayHandle::<Id, D>::new();
    let num_instances = flags.len();
    let params = ScatterParameters {
        flags: flags.prepare_for_input(),
        offsets: offsets.prepare_for_input(),
        output: output.prepare_for_output(count),
    };
    scheduler.schedule("StreamCompact", scatter_index, &params, num_instances)?;
    output.complete_execution_write();
    Ok(output)
}
