//! Unstructured grids with explicit connectivity.

use dax_types::{DaxError, DaxResult, Id, Vector3};
use serde::{Deserialize, Serialize};

use crate::cell::{CellShape, CellVertices};
use crate::topology::{Topology, TopologyUnstructured};

/// A grid of cells of a single shape with explicit connections.
///
/// `connections` holds `shape.num_points()` point indices per cell,
/// concatenated in cell order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstructuredGrid {
    shape: CellShape,
    connections: Vec<Id>,
    points: Vec<Vector3>,
}

impl UnstructuredGrid {
    /// Creates a grid, checking only that the connection array holds a
    /// whole number of cells. Point references are checked lazily; see
    /// [`UnstructuredGrid::validate`] for an eager check.
    pub fn new(shape: CellShape, connections: Vec<Id>, points: Vec<Vector3>) -> DaxResult<Self> {
        let points_per_cell = shape.num_points();
        if connections.len() % points_per_cell != 0 {
            return Err(DaxError::InvalidGrid(format!(
                "{} connections is not a multiple of {} points per {} cell",
                connections.len(),
                points_per_cell,
                shape.name()
            )));
        }
        Ok(Self {
            shape,
            connections,
            points,
        })
    }

    /// Checks that every connection references an existing point.
    pub fn validate(&self) -> DaxResult<()> {
        let num_points = self.points.len();
        match self.connections.iter().position(|&p| p >= num_points) {
            Some(position) => Err(DaxError::InvalidGrid(format!(
                "cell {} references point {} but the grid has {} points",
                position / self.shape.num_points(),
                self.connections[position],
                num_points
            ))),
            None => Ok(()),
        }
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    pub fn connections(&self) -> &[Id] {
        &self.connections
    }

    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    /// Mutable access to the point coordinates. The point count is fixed.
    pub fn points_mut(&mut self) -> &mut [Vector3] {
        &mut self.points
    }

    /// Returns an execution view borrowing this grid's arrays.
    pub fn topology(&self) -> TopologyUnstructured<&[Id], &[Vector3]> {
        TopologyUnstructured::new(self.shape, &self.connections[..], &self.points[..])
    }
}

impl Topology for UnstructuredGrid {
    fn cell_shape(&self) -> CellShape {
        self.shape
    }

    fn number_of_points(&self) -> Id {
        self.points.len()
    }

    fn number_of_cells(&self) -> Id {
        self.connections.len() / self.shape.num_points()
    }

    fn cell_connections(&self, cell_index: Id) -> DaxResult<CellVertices> {
        self.topology().cell_connections(cell_index)
    }

    fn point_coordinates(&self, point_index: Id) -> DaxResult<Vector3> {
        self.topology().point_coordinates(point_index)
    }
}
