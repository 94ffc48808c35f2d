//! Execution-side array containers.
//!
//! A container owns the execution copy of one array. Data moves between
//! control and execution storage only through explicit copies, whose
//! lengths must match the allocation exactly.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use dax_types::{ArrayPortal, DaxError, DaxResult, Element, Id};

/// Execution-side storage for an array of `T`.
///
/// Containers are move-only: one handle or argument owns each allocation.
pub trait ArrayContainerExecution<T: Element>: Default + Send + Sync {
    /// Resizes to exactly `num_values` elements, discarding the contents.
    fn allocate(&mut self, num_values: Id);

    /// Copies `src` into the execution array.
    ///
    /// # Panics
    /// Panics if `src.len()` differs from the allocated size.
    fn copy_from_control(&mut self, src: &[T]);

    /// Copies the execution array into `dst`.
    ///
    /// # Panics
    /// Panics if `dst.len()` differs from the allocated size.
    fn copy_to_control(&self, dst: &mut [T]);

    /// Frees the execution array. Equivalent to `allocate(0)`.
    fn release_resources(&mut self) {
        self.allocate(0);
    }

    /// Returns the allocated number of elements.
    fn len(&self) -> Id;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a view of the execution array for scheduled functors.
    ///
    /// The view borrows the container, so it cannot outlive the next
    /// reallocation.
    fn execution_array(&mut self) -> ExecutionArray<'_, T>;
}

/// Pointer and length into an execution array, shared by every
/// invocation of a schedule.
///
/// Reads are safe. Writes are `unsafe`: each index must be written by at
/// most one invocation, and no other invocation may access that index
/// during the schedule.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionArray<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: the view is derived from an exclusive borrow. Concurrent access
// is restricted by the contract of `set`.
unsafe impl<T: Send + Sync> Send for ExecutionArray<'_, T> {}
unsafe impl<T: Send + Sync> Sync for ExecutionArray<'_, T> {}

impl<'a, T: Element> ExecutionArray<'a, T> {
    pub fn new(values: &'a mut [T]) -> Self {
        Self {
            ptr: values.as_mut_ptr(),
            len: values.len(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads the value at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: Id) -> T {
        assert!(index < self.len, "index {index} out of range (length {})", self.len);
        // SAFETY: in bounds; the pointer is valid for the borrow 'a.
        unsafe { self.ptr.add(index).read() }
    }

    /// Writes `value` at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    ///
    /// # Safety
    /// No other invocation may read or write `index` while this schedule
    /// runs.
    #[inline]
    pub unsafe fn set(&self, index: Id, value: T) {
        assert!(index < self.len, "index {index} out of range (length {})", self.len);
        self.ptr.add(index).write(value);
    }

    /// Writes `values` starting at `start`.
    ///
    /// # Safety
    /// Same as [`ExecutionArray::set`] for every index written.
    pub unsafe fn set_range(&self, start: Id, values: &[T]) {
        let end = start + values.len();
        assert!(end <= self.len, "range {start}..{end} out of range (length {})", self.len);
        std::ptr::copy_nonoverlapping(values.as_ptr(), self.ptr.add(start), values.len());
    }
}

impl<T: Element> ArrayPortal<T> for ExecutionArray<'_, T> {
    #[inline]
    fn number_of_values(&self) -> Id {
        self.len
    }

    #[inline]
    fn get(&self, index: Id) -> T {
        ExecutionArray::get(self, index)
    }

    fn try_get(&self, index: Id) -> DaxResult<T> {
        if index < self.len {
            Ok(ExecutionArray::get(self, index))
        } else {
            Err(DaxError::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }
}

/// Container for adapters that execute in control memory.
///
/// The execution array is a separate `Vec`, so copies still happen, but
/// no special memory is involved.
#[derive(Debug, Default)]
pub struct HostContainer<T> {
    values: Vec<T>,
}

impl<T: Element> ArrayContainerExecution<T> for HostContainer<T> {
    fn allocate(&mut self, num_values: Id) {
        self.values = vec![T::default(); num_values];
    }

    fn copy_from_control(&mut self, src: &[T]) {
        assert_eq!(
            src.len(),
            self.values.len(),
            "control array length must match execution allocation"
        );
        self.values.copy_from_slice(src);
    }

    fn copy_to_control(&self, dst: &mut [T]) {
        assert_eq!(
            dst.len(),
            self.values.len(),
            "control array length must match execution allocation"
        );
        dst.copy_from_slice(&self.values);
    }

    fn release_resources(&mut self) {
        self.values = Vec::new();
    }

    fn len(&self) -> Id {
        self.values.len()
    }

    fn execution_array(&mut self) -> ExecutionArray<'_, T> {
        ExecutionArray::new(&mut self.values)
    }
}

/// Byte counts moved across the control/execution boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub to_device_bytes: u64,
    pub to_host_bytes: u64,
}

/// Container for the kernel adapter's device memory.
///
/// The allocation is fixed-size once made and is reached only through
/// [`copy_from_control`](ArrayContainerExecution::copy_from_control),
/// [`copy_to_control`](ArrayContainerExecution::copy_to_control), and
/// execution views. Transferred bytes are counted.
#[derive(Debug, Default)]
pub struct DeviceContainer<T> {
    values: Box<[T]>,
    to_device_bytes: AtomicU64,
    to_host_bytes: AtomicU64,
}

impl<T> DeviceContainer<T> {
    /// Bytes transferred since this container was created.
    pub fn transfer_stats(&self) -> TransferStats {
        TransferStats {
            to_device_bytes: self.to_device_bytes.load(Ordering::Relaxed),
            to_host_bytes: self.to_host_bytes.load(Ordering::Relaxed),
        }
    }
}

fn byte_len<T>(values: &[T]) -> u64 {
    std::mem::size_of_val(values) as u64
}

impl<T: Element> ArrayContainerExecution<T> for DeviceContainer<T> {
    fn allocate(&mut self, num_values: Id) {
        self.values = vec![T::default(); num_values].into_boxed_slice();
    }

    fn copy_from_control(&mut self, src: &[T]) {
        assert_eq!(
            src.len(),
            self.values.len(),
            "control array length must match device allocation"
        );
        self.values.copy_from_slice(src);
        self.to_device_bytes.fetch_add(byte_len(src), Ordering::Relaxed);
    }

    fn copy_to_control(&self, dst: &mut [T]) {
        assert_eq!(
            dst.len(),
            self.values.len(),
            "control array length must match device allocation"
        );
        dst.copy_from_slice(&self.values);
        self.to_host_bytes.fetch_add(byte_len(dst), Ordering::Relaxed);
    }

    fn len(&self) -> Id {
        self.values.len()
    }

    fn execution_array(&mut self) -> ExecutionArray<'_, T> {
        ExecutionArray::new(&mut self.values)
    }
}
