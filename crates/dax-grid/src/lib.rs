//! # dax-grid
//!
//! Grid topology for the Dax execution layer.
//!
//! ## Key Types
//!
//! - [`UniformGrid`]: Implicit topology from origin, spacing, and extent.
//! - [`UnstructuredGrid`]: Explicit connectivity for a single cell shape.
//! - [`CellShape`]: Per-shape constants: point count, dimension, and the
//!   hexahedron decomposition table.
//! - [`Topology`]: Cell connection and coordinate lookup shared by the
//!   control-side grids and the execution-side topology views.
//! - Procedural generators that derive every cell shape from a hexahedral
//!   grid, used by tests and benchmarks.

pub mod cell;
pub mod generators;
pub mod topology;
pub mod uniform;
pub mod unstructured;

pub use cell::{Cell, CellField, CellShape, CellTuple, CellVertices, MAX_CELL_POINTS};
pub use generators::TestGrid;
pub use topology::{cell_field_values, Topology, TopologyUniform, TopologyUnstructured};
pub use uniform::UniformGrid;
pub use unstructured::UnstructuredGrid;
