//! Value types that can live in an execution array.

/// Marker for values that can be stored in array handles and containers.
///
/// Values are plain data: they are copied between control and execution
/// memory and shared by reference across worker threads.
pub trait Element: Copy + Default + Send + Sync + 'static {}

impl<T> Element for T where T: Copy + Default + Send + Sync + 'static {}
