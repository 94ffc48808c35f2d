//! Cell topology lookup.
//!
//! [`Topology`] is implemented by the control-side grids and by the
//! lightweight execution-side views they hand to scheduled work. The views
//! borrow or copy just enough state to answer connection and coordinate
//! queries for one cell at a time.

use dax_types::extent::{flat_index_to_index3, flat_index_to_index3_cell, index3_to_flat_index};
use dax_types::{ArrayPortal, DaxError, DaxResult, Domain, Extent3, Id, Vector3};

use crate::cell::{Cell, CellField, CellShape, CellVertices, HEXAHEDRON_VERTEX_OFFSETS};

/// Connection and coordinate lookup for a grid of one cell shape.
pub trait Topology {
    /// Shape shared by every cell of the grid.
    fn cell_shape(&self) -> CellShape;

    fn number_of_points(&self) -> Id;

    fn number_of_cells(&self) -> Id;

    /// Global point indices of the vertices of cell `cell_index`.
    fn cell_connections(&self, cell_index: Id) -> DaxResult<CellVertices>;

    /// Coordinates of point `point_index`.
    fn point_coordinates(&self, point_index: Id) -> DaxResult<Vector3>;

    /// Length of the given scheduling domain over this grid.
    fn domain_length(&self, domain: Domain) -> Id {
        match domain {
            Domain::Point => self.number_of_points(),
            Domain::Cell => self.number_of_cells(),
        }
    }

    /// Builds the view of cell `cell_index`.
    ///
    /// Connections that reference points outside the grid are reported
    /// here, when the cell is dereferenced.
    fn cell(&self, cell_index: Id) -> DaxResult<Cell> {
        let point_indices = self.cell_connections(cell_index)?;
        let mut coordinates = CellField::<Vector3>::new(point_indices.len());
        for (slot, &point) in coordinates.as_mut_slice().iter_mut().zip(point_indices.iter()) {
            *slot = self.point_coordinates(point)?;
        }
        Ok(Cell::new(
            self.cell_shape(),
            cell_index,
            point_indices,
            coordinates,
        ))
    }
}

/// Gathers one value of a point field for each vertex of `cell`.
pub fn cell_field_values<T, P>(cell: &Cell, field: &P) -> DaxResult<CellField<T>>
where
    T: Copy + Default,
    P: ArrayPortal<T> + ?Sized,
{
    let mut values = CellField::<T>::new(cell.number_of_points());
    for (slot, &point) in values.as_mut_slice().iter_mut().zip(cell.point_indices().iter()) {
        *slot = field.try_get(point)?;
    }
    Ok(values)
}

fn check_cell_index(cell_index: Id, number_of_cells: Id) -> DaxResult<()> {
    if cell_index < number_of_cells {
        Ok(())
    } else {
        Err(DaxError::IndexOutOfRange {
            index: cell_index,
            len: number_of_cells,
        })
    }
}

/// Execution view of a uniform grid. Everything is derived from the
/// origin, spacing, and extent, so the view is a plain copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyUniform {
    pub origin: Vector3,
    pub spacing: Vector3,
    pub extent: Extent3,
}

impl Topology for TopologyUniform {
    #[inline]
    fn cell_shape(&self) -> CellShape {
        CellShape::Hexahedron
    }

    #[inline]
    fn number_of_points(&self) -> Id {
        self.extent.number_of_points()
    }

    #[inline]
    fn number_of_cells(&self) -> Id {
        self.extent.number_of_cells()
    }

    fn cell_connections(&self, cell_index: Id) -> DaxResult<CellVertices> {
        check_cell_index(cell_index, self.number_of_cells())?;
        let base = flat_index_to_index3_cell(cell_index, &self.extent);
        let mut connections = CellVertices::new(HEXAHEDRON_VERTEX_OFFSETS.len());
        for (slot, offset) in connections
            .as_mut_slice()
            .iter_mut()
            .zip(HEXAHEDRON_VERTEX_OFFSETS.iter())
        {
            *slot = index3_to_flat_index(base + *offset, &self.extent);
        }
        Ok(connections)
    }

    fn point_coordinates(&self, point_index: Id) -> DaxResult<Vector3> {
        let len = self.number_of_points();
        if point_index >= len {
            return Err(DaxError::IndexOutOfRange {
                index: point_index,
                len,
            });
        }
        let ijk = flat_index_to_index3(point_index, &self.extent);
        Ok(self.origin + self.spacing * (ijk - self.extent.min).as_vec3())
    }
}

/// Execution view of an unstructured grid over two portals: the flat
/// connection array and the point coordinates.
///
/// Connection entries are not checked against the point count until a
/// cell referencing them is dereferenced.
#[derive(Debug, Clone, Copy)]
pub struct TopologyUnstructured<C, P> {
    shape: CellShape,
    connections: C,
    coordinates: P,
}

impl<C, P> TopologyUnstructured<C, P>
where
    C: ArrayPortal<Id>,
    P: ArrayPortal<Vector3>,
{
    pub fn new(shape: CellShape, connections: C, coordinates: P) -> Self {
        Self {
            shape,
            connections,
            coordinates,
        }
    }

    pub fn connections(&self) -> &C {
        &self.connections
    }

    pub fn coordinates(&self) -> &P {
        &self.coordinates
    }
}

impl<C, P> Topology for TopologyUnstructured<C, P>
where
    C: ArrayPortal<Id>,
    P: ArrayPortal<Vector3>,
{
    #[inline]
    fn cell_shape(&self) -> CellShape {
        self.shape
    }

    #[inline]
    fn number_of_points(&self) -> Id {
        self.coordinates.number_of_values()
    }

    #[inline]
    fn number_of_cells(&self) -> Id {
        self.connections.number_of_values() / self.shape.num_points()
    }

    fn cell_connections(&self, cell_index: Id) -> DaxResult<CellVertices> {
        check_cell_index(cell_index, self.number_of_cells())?;
        let points_per_cell = self.shape.num_points();
        let base = cell_index * points_per_cell;
        let mut connections = CellVertices::new(points_per_cell);
        for (offset, slot) in connections.as_mut_slice().iter_mut().enumerate() {
            *slot = self.connections.get(base + offset);
        }
        Ok(connections)
    }

    #[inline]
    fn point_coordinates(&self, point_index: Id) -> DaxResult<Vector3> {
        self.coordinates.try_get(point_index)
    }
}
