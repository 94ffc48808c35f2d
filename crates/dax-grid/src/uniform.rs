//! Uniform rectilinear grids.

use dax_types::{DaxResult, Extent3, Id, Id3, Vector3};
use serde::{Deserialize, Serialize};

use crate::cell::{CellShape, CellVertices};
use crate::topology::{Topology, TopologyUniform};

/// A regular lattice of hexahedral cells.
///
/// Topology is implicit: point `ijk` sits at
/// `origin + spacing * (ijk - extent.min)` and every cell is the
/// hexahedron above its lowest point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformGrid {
    origin: Vector3,
    spacing: Vector3,
    extent: Extent3,
}

impl Default for UniformGrid {
    /// Origin at zero, unit spacing, a single point.
    fn default() -> Self {
        Self {
            origin: Vector3::ZERO,
            spacing: Vector3::ONE,
            extent: Extent3::default(),
        }
    }
}

impl UniformGrid {
    pub fn new(origin: Vector3, spacing: Vector3, extent: Extent3) -> Self {
        Self {
            origin,
            spacing,
            extent,
        }
    }

    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vector3) {
        self.origin = origin;
    }

    pub fn spacing(&self) -> Vector3 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: Vector3) {
        self.spacing = spacing;
    }

    pub fn extent(&self) -> Extent3 {
        self.extent
    }

    /// Sets the inclusive point index range `min..=max` on each axis.
    pub fn set_extent(&mut self, min: Id3, max: Id3) {
        self.extent = Extent3::new(min, max);
    }

    /// Returns the execution view of this grid.
    pub fn topology(&self) -> TopologyUniform {
        TopologyUniform {
            origin: self.origin,
            spacing: self.spacing,
            extent: self.extent,
        }
    }
}

impl Topology for UniformGrid {
    fn cell_shape(&self) -> CellShape {
        CellShape::Hexahedron
    }

    fn number_of_points(&self) -> Id {
        self.extent.number_of_points()
    }

    fn number_of_cells(&self) -> Id {
        self.extent.number_of_cells()
    }

    fn cell_connections(&self, cell_index: Id) -> DaxResult<CellVertices> {
        self.topology().cell_connections(cell_index)
    }

    fn point_coordinates(&self, point_index: Id) -> DaxResult<Vector3> {
        self.topology().point_coordinates(point_index)
    }
}
