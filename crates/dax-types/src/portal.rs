//! Read-only array portals.
//!
//! A portal is the minimal view a topology needs to look up connections
//! or coordinates: a length and indexed reads. Control-side slices and
//! execution-side arrays both implement it, so the same topology code
//! runs in either environment.

use crate::error::{DaxError, DaxResult};
use crate::scalar::Id;

/// Indexed read access to a contiguous array of values.
pub trait ArrayPortal<T> {
    /// Returns the number of values in the array.
    fn number_of_values(&self) -> Id;

    /// Returns the value at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.number_of_values()`.
    fn get(&self, index: Id) -> T;

    /// Returns the value at `index`, or an error if it is out of range.
    fn try_get(&self, index: Id) -> DaxResult<T> {
        let len = self.number_of_values();
        if index < len {
            Ok(self.get(index))
        } else {
            Err(DaxError::IndexOutOfRange { index, len })
        }
    }
}

impl<T: Copy> ArrayPortal<T> for [T] {
    #[inline]
    fn number_of_values(&self) -> Id {
        self.len()
    }

    #[inline]
    fn get(&self, index: Id) -> T {
        self[index]
    }
}

impl<T: Copy> ArrayPortal<T> for Vec<T> {
    #[inline]
    fn number_of_values(&self) -> Id {
        self.len()
    }

    #[inline]
    fn get(&self, index: Id) -> T {
        self[index]
    }
}

impl<T, P: ArrayPortal<T> + ?Sized> ArrayPortal<T> for &P {
    #[inline]
    fn number_of_values(&self) -> Id {
        (**self).number_of_values()
    }

    #[inline]
    fn get(&self, index: Id) -> T {
        (**self).get(index)
    }
}
