//! Per-instance field arguments.

use std::mem::size_of;

use dax_device::{DeviceAdapter, ExecutionArray};
use dax_types::{DaxResult, Domain, Element, Id};

use super::{Argument, Direction, ExecArg};
use crate::array_handle::ArrayHandle;

/// One value per instance, read from or written to an [`ArrayHandle`].
pub struct Field<'h, T: Element, D: DeviceAdapter> {
    handle: &'h mut ArrayHandle<T, D>,
    direction: Direction,
}

impl<'h, T: Element, D: DeviceAdapter> Field<'h, T, D> {
    /// Reads `handle`. Its length constrains the domain.
    pub fn input(handle: &'h mut ArrayHandle<T, D>) -> Self {
        Self {
            handle,
            direction: Direction::In,
        }
    }

    /// Writes `handle`, resized to the domain length. Instances start
    /// from `T::default()`.
    pub fn output(handle: &'h mut ArrayHandle<T, D>) -> Self {
        Self {
            handle,
            direction: Direction::Out,
        }
    }

    /// Reads and writes `handle` in place. Its length constrains the domain.
    pub fn in_out(handle: &'h mut ArrayHandle<T, D>) -> Self {
        Self {
            handle,
            direction: Direction::InOut,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl<T: Element, D: DeviceAdapter> Argument<D> for Field<'_, T, D> {
    type Value = T;
    type Exec<'a> = FieldExec<'a, T> where Self: 'a;

    fn describe(&self) -> String {
        format!("{:?} field of {} values", self.direction, self.handle.len())
    }

    fn domain_length(&self, _domain: Domain) -> DaxResult<Option<Id>> {
        Ok(match self.direction {
            Direction::Out => None,
            Direction::In | Direction::InOut => Some(self.handle.len()),
        })
    }

    fn prepare<'a>(&'a mut self, size: Id) -> DaxResult<FieldExec<'a, T>> {
        // A failed write falls back to the control copy, so it must be current.
        if self.direction.writes() {
            self.handle.sync_control_array();
        }
        let array = match self.direction {
            Direction::In => self.handle.prepare_for_input(),
            Direction::Out => self.handle.prepare_for_output(size),
            Direction::InOut => self.handle.prepare_for_in_place(),
        };
        Ok(FieldExec {
            array,
            direction: self.direction,
        })
    }

    fn finish(&mut self) {
        if self.direction.writes() {
            self.handle.complete_execution_write();
            self.handle.sync_control_array();
        }
    }

    fn abort(&mut self) {
        if self.direction.writes() {
            self.handle.discard_execution();
        }
    }

    fn bytes_to_execution(&self) -> u64 {
        if self.direction.reads() && !self.handle.is_execution_valid() {
            (self.handle.len() * size_of::<T>()) as u64
        } else {
            0
        }
    }

    fn bytes_to_control(&self, size: Id) -> u64 {
        if self.direction.writes() {
            (size * size_of::<T>()) as u64
        } else {
            0
        }
    }
}

/// Execution view of a [`Field`].
#[derive(Debug, Clone, Copy)]
pub struct FieldExec<'a, T> {
    array: ExecutionArray<'a, T>,
    direction: Direction,
}

impl<T: Element> ExecArg for FieldExec<'_, T> {
    type Value = T;

    #[inline]
    fn fetch(&self, index: Id) -> DaxResult<T> {
        Ok(match self.direction {
            Direction::Out => T::default(),
            Direction::In | Direction::InOut => self.array.get(index),
        })
    }

    #[inline]
    unsafe fn store(&self, index: Id, value: &T) {
        if self.direction.writes() {
            self.array.set(index, *value);
        }
    }
}
