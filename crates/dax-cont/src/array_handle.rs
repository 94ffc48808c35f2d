//! Control-side array handles.
//!
//! An [`ArrayHandle`] owns a control `Vec` and the execution container of
//! its device. Two validity flags record which copy holds current data,
//! so repeated preparation as input skips redundant transfers and control
//! reads copy back only when the execution copy is newer.

use dax_device::{ArrayContainerExecution, DeviceAdapter, ExecutionArray};
use dax_types::{Element, Id};
use tracing::trace;

/// An array with a control copy and a lazily transferred execution copy.
pub struct ArrayHandle<T: Element, D: DeviceAdapter> {
    control: Vec<T>,
    execution: D::Container<T>,
    control_valid: bool,
    execution_valid: bool,
}

impl<T: Element, D: DeviceAdapter> ArrayHandle<T, D> {
    /// Creates an empty handle.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a handle whose control copy is `values`.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            control: values,
            execution: Default::default(),
            control_valid: true,
            execution_valid: false,
        }
    }

    /// Creates a handle of `len` default values.
    pub fn with_len(len: Id) -> Self {
        Self::from_vec(vec![T::default(); len])
    }

    /// Number of values in the current copy.
    pub fn len(&self) -> Id {
        if self.control_valid {
            self.control.len()
        } else {
            self.execution.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_control_valid(&self) -> bool {
        self.control_valid
    }

    pub fn is_execution_valid(&self) -> bool {
        self.execution_valid
    }

    /// The execution container, for inspection.
    pub fn execution_container(&self) -> &D::Container<T> {
        &self.execution
    }

    /// Makes the execution copy current and returns a view of it.
    /// Transfers only if the execution copy is stale.
    pub fn prepare_for_input(&mut self) -> ExecutionArray<'_, T> {
        if !self.execution_valid {
            trace!(len = self.control.len(), "transfer to execution");
            self.execution.allocate(self.control.len());
            self.execution.copy_from_control(&self.control);
            self.execution_valid = true;
        }
        self.execution.execution_array()
    }

    /// Allocates `len` execution values without reading control data.
    ///
    /// The control copy stays current until
    /// [`complete_execution_write`](Self::complete_execution_write).
    pub fn prepare_for_output(&mut self, len: Id) -> ExecutionArray<'_, T> {
        self.execution.allocate(len);
        self.execution_valid = false;
        self.execution.execution_array()
    }

    /// Makes the execution copy current for reading and writing.
    pub fn prepare_for_in_place(&mut self) -> ExecutionArray<'_, T> {
        self.prepare_for_input()
    }

    /// Marks the execution copy as the only current one after a
    /// successful write.
    pub fn complete_execution_write(&mut self) {
        self.execution_valid = true;
        self.control_valid = false;
    }

    /// Drops execution writes from a failed schedule and falls back to the
    /// control copy.
    ///
    /// Writers sync the control copy before preparing, so it is current
    /// here. If it is not, the execution copy is the only data left and is
    /// kept.
    pub fn discard_execution(&mut self) {
        if self.control_valid {
            self.execution_valid = false;
        }
    }

    /// Copies execution data back if the control copy is stale.
    pub fn sync_control_array(&mut self) {
        if self.control_valid {
            return;
        }
        trace!(len = self.execution.len(), "transfer to control");
        self.control.clear();
        self.control.resize(self.execution.len(), T::default());
        self.execution.copy_to_control(&mut self.control);
        self.control_valid = true;
    }

    /// Frees the execution copy, copying it back first if needed.
    pub fn release_execution_resources(&mut self) {
        self.sync_control_array();
        self.execution.release_resources();
        self.execution_valid = false;
    }

    /// Returns the current values, copying back if needed.
    pub fn control_slice(&mut self) -> &[T] {
        self.sync_control_array();
        &self.control
    }

    /// Returns the values for modification. The execution copy becomes stale.
    pub fn control_slice_mut(&mut self) -> &mut [T] {
        self.sync_control_array();
        self.execution_valid = false;
        &mut self.control
    }

    /// Consumes the handle, returning its current values.
    pub fn into_vec(mut self) -> Vec<T> {
        self.sync_control_array();
        self.control
    }
}

impl<T: Element, D: DeviceAdapter> Default for ArrayHandle<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element, D: DeviceAdapter> From<Vec<T>> for ArrayHandle<T, D> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: Element + std::fmt::Debug, D: DeviceAdapter> std::fmt::Debug for ArrayHandle<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayHandle")
            .field("len", &self.len())
            .field("control_valid", &self.control_valid)
            .field("execution_valid", &self.execution_valid)
            .finish()
    }
}
