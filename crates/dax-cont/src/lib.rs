//! # dax-cont
//!
//! The control environment of the Dax execution layer.
//!
//! ## Key Types
//!
//! - [`ArrayHandle`]: Control array with a lazily transferred execution copy.
//! - [`Scheduler`]: Runs a [`Worklet`] over a tuple of bound arguments on a
//!   device adapter.
//! - [`arg`]: Argument kinds: [`Field`], [`Topology`], [`FieldPoints`].
//! - [`ExtractTopology`]: Flattened connections of a grid or cell subset.
//! - [`stream_compact`]: Indices of non-default entries of a stencil.

pub mod arg;
pub mod array_handle;
pub mod compact;
pub mod extract;
pub mod scheduler;
pub mod worklet;

pub use arg::{Direction, ExecutionTopology, Field, FieldPoints, Topology};
pub use array_handle::ArrayHandle;
pub use compact::stream_compact;
pub use extract::ExtractTopology;
pub use scheduler::Scheduler;
pub use worklet::Worklet;
