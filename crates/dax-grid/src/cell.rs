//! Cell shapes and per-invocation cell views.
//!
//! Every shape is described by one row of a constant table instead of a
//! type per shape. Algorithms look up the row they need (point count,
//! dimension, decomposition) and stay generic over the shape.

use std::ops::{Index, IndexMut};

use dax_types::{Id, Id3, Vector3};
use serde::{Deserialize, Serialize};

/// Largest number of points any supported cell has (the hexahedron).
pub const MAX_CELL_POINTS: usize = 8;

/// Offsets from a hexahedron's lowest point to each of its 8 vertices,
/// in canonical local-vertex order.
pub const HEXAHEDRON_VERTEX_OFFSETS: [Id3; 8] = [
    Id3::new(0, 0, 0),
    Id3::new(1, 0, 0),
    Id3::new(1, 1, 0),
    Id3::new(0, 1, 0),
    Id3::new(0, 0, 1),
    Id3::new(1, 0, 1),
    Id3::new(1, 1, 1),
    Id3::new(0, 1, 1),
];

/// The supported cell shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellShape {
    Vertex,
    Line,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Wedge,
    Hexahedron,
}

struct ShapeTraits {
    name: &'static str,
    num_points: usize,
    dimension: u8,
    /// Local hexahedron vertices of each cell cut from one hexahedron.
    decomposition: &'static [&'static [usize]],
}

const VERTEX: ShapeTraits = ShapeTraits {
    name: "vertex",
    num_points: 1,
    dimension: 0,
    decomposition: &[&[0]],
};

// The 3 edges at vertex 0 plus the 4 major diagonals.
const LINE: ShapeTraits = ShapeTraits {
    name: "line",
    num_points: 2,
    dimension: 1,
    decomposition: &[&[0, 1], &[0, 3], &[0, 4], &[0, 6], &[1, 7], &[2, 4], &[3, 5]],
};

// Two disjoint triangles along face diagonals. Neighboring hexahedra pick
// matching diagonals so the triangles form conformal planar sheets.
const TRIANGLE: ShapeTraits = ShapeTraits {
    name: "triangle",
    num_points: 3,
    dimension: 2,
    decomposition: &[&[0, 5, 7], &[6, 3, 1]],
};

// Cuts the hexahedron diagonally in the x-y direction.
const QUADRILATERAL: ShapeTraits = ShapeTraits {
    name: "quadrilateral",
    num_points: 4,
    dimension: 2,
    decomposition: &[&[0, 2, 6, 4]],
};

// Freudenthal subdivision around the 2-4 diagonal.
const TETRAHEDRON: ShapeTraits = ShapeTraits {
    name: "tetrahedron",
    num_points: 4,
    dimension: 3,
    decomposition: &[
        &[0, 1, 2, 4],
        &[1, 5, 2, 4],
        &[5, 6, 2, 4],
        &[6, 7, 2, 4],
        &[7, 3, 2, 4],
        &[3, 0, 2, 4],
    ],
};

// Cut along the x/y diagonal.
const WEDGE: ShapeTraits = ShapeTraits {
    name: "wedge",
    num_points: 6,
    dimension: 3,
    decomposition: &[&[0, 3, 2, 4, 7, 6], &[0, 2, 1, 4, 6, 5]],
};

const HEXAHEDRON: ShapeTraits = ShapeTraits {
    name: "hexahedron",
    num_points: 8,
    dimension: 3,
    decomposition: &[&[0, 1, 2, 3, 4, 5, 6, 7]],
};

impl CellShape {
    /// All supported shapes, lowest dimension first.
    pub const ALL: [CellShape; 7] = [
        CellShape::Vertex,
        CellShape::Line,
        CellShape::Triangle,
        CellShape::Quadrilateral,
        CellShape::Tetrahedron,
        CellShape::Wedge,
        CellShape::Hexahedron,
    ];

    fn traits(self) -> &'static ShapeTraits {
        match self {
            CellShape::Vertex => &VERTEX,
            CellShape::Line => &LINE,
            CellShape::Triangle => &TRIANGLE,
            CellShape::Quadrilateral => &QUADRILATERAL,
            CellShape::Tetrahedron => &TETRAHEDRON,
            CellShape::Wedge => &WEDGE,
            CellShape::Hexahedron => &HEXAHEDRON,
        }
    }

    /// Returns a lowercase name for logs and benchmark labels.
    pub fn name(self) -> &'static str {
        self.traits().name
    }

    /// Number of points in one cell of this shape.
    #[inline]
    pub fn num_points(self) -> usize {
        self.traits().num_points
    }

    /// Topological dimension (0 for vertices up to 3 for solids).
    #[inline]
    pub fn topological_dimension(self) -> u8 {
        self.traits().dimension
    }

    /// Local hexahedron vertex lists, one per cell cut from a hexahedron.
    pub fn hexahedron_decomposition(self) -> &'static [&'static [usize]] {
        self.traits().decomposition
    }

    /// Number of cells of this shape produced from one hexahedron.
    pub fn cells_per_hexahedron(self) -> usize {
        self.traits().decomposition.len()
    }
}

/// A fixed-capacity tuple holding one value per cell vertex.
///
/// Capacity is [`MAX_CELL_POINTS`]; only the first `len()` entries are
/// meaningful. Being `Copy`, it travels by value through scheduled
/// functors without touching the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTuple<T> {
    values: [T; MAX_CELL_POINTS],
    len: u8,
}

/// Global point indices of a cell's vertices.
pub type CellVertices = CellTuple<Id>;

/// One field value per cell vertex.
pub type CellField<T> = CellTuple<T>;

impl<T: Copy + Default> CellTuple<T> {
    /// Creates a tuple of `len` default values.
    ///
    /// # Panics
    /// Panics if `len > MAX_CELL_POINTS`.
    pub fn new(len: usize) -> Self {
        assert!(
            len <= MAX_CELL_POINTS,
            "cell tuple of length {len} exceeds capacity {MAX_CELL_POINTS}"
        );
        Self {
            values: [T::default(); MAX_CELL_POINTS],
            len: len as u8,
        }
    }

    /// Creates a tuple holding a copy of `values`.
    ///
    /// # Panics
    /// Panics if `values.len() > MAX_CELL_POINTS`.
    pub fn from_slice(values: &[T]) -> Self {
        let mut tuple = Self::new(values.len());
        tuple.as_mut_slice().copy_from_slice(values);
        tuple
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true if the tuple has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values[..self.len as usize]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values[..self.len as usize]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy + Default> Default for CellTuple<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Copy + Default> Index<usize> for CellTuple<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: Copy + Default> IndexMut<usize> for CellTuple<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

/// A lightweight, execution-side view of one cell.
///
/// Built per invocation from a topology and a cell index. Carries the
/// cell's point indices and the coordinates of those points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    shape: CellShape,
    index: Id,
    point_indices: CellVertices,
    coordinates: CellField<Vector3>,
}

impl Cell {
    /// Assembles a cell from its connections and vertex coordinates.
    ///
    /// Both tuples must hold `shape.num_points()` entries.
    pub fn new(
        shape: CellShape,
        index: Id,
        point_indices: CellVertices,
        coordinates: CellField<Vector3>,
    ) -> Self {
        debug_assert_eq!(point_indices.len(), shape.num_points());
        debug_assert_eq!(coordinates.len(), shape.num_points());
        Self {
            shape,
            index,
            point_indices,
            coordinates,
        }
    }

    #[inline]
    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Flat index of this cell in its grid.
    #[inline]
    pub fn index(&self) -> Id {
        self.index
    }

    #[inline]
    pub fn number_of_points(&self) -> usize {
        self.shape.num_points()
    }

    /// Given a local vertex index (0 to `number_of_points() - 1`), returns
    /// the index of that point in point space.
    #[inline]
    pub fn point_index(&self, vertex: usize) -> Id {
        self.point_indices[vertex]
    }

    /// Returns the point indices of all vertices.
    #[inline]
    pub fn point_indices(&self) -> &CellVertices {
        &self.point_indices
    }

    /// Returns the coordinates of all vertices.
    #[inline]
    pub fn vertex_coordinates(&self) -> &CellField<Vector3> {
        &self.coordinates
    }

    /// Arithmetic mean of the vertex coordinates.
    pub fn centroid(&self) -> Vector3 {
        let sum: Vector3 = self.coordinates.iter().copied().sum();
        sum / self.coordinates.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposition_lists_match_point_counts() {
        for shape in CellShape::ALL {
            for cell in shape.hexahedron_decomposition() {
                assert_eq!(cell.len(), shape.num_points(), "{}", shape.name());
                assert!(cell.iter().all(|&v| v < 8));
            }
        }
    }

    #[test]
    #[should_panic]
    fn tuple_capacity_is_enforced() {
        let _ = CellTuple::<Id>::new(MAX_CELL_POINTS + 1);
    }
}
