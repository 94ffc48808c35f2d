//! Structured extents and flat ↔ 3D index conversion.
//!
//! An extent is an inclusive box of point indices `[min, max]`. Points
//! are numbered with x varying fastest, then y, then z, all relative to
//! `min`. Cells use the same ordering over a box one smaller per axis.

use serde::{Deserialize, Serialize};

use crate::scalar::{Id, Id3};

/// Inclusive min/max point indices of a structured grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent3 {
    /// Lowest point index on each axis.
    pub min: Id3,
    /// Highest point index on each axis (inclusive).
    pub max: Id3,
}

impl Extent3 {
    /// Creates an extent from its inclusive corners.
    pub fn new(min: Id3, max: Id3) -> Self {
        Self { min, max }
    }

    /// Number of points along each axis. Inverted axes count as zero.
    #[inline]
    pub fn point_dimensions(&self) -> Id3 {
        (self.max - self.min + Id3::ONE).max(Id3::ZERO)
    }

    /// Number of cells along each axis. Inverted axes count as zero.
    #[inline]
    pub fn cell_dimensions(&self) -> Id3 {
        (self.max - self.min).max(Id3::ZERO)
    }

    /// Total number of points: `Π(max_i - min_i + 1)`.
    #[inline]
    pub fn number_of_points(&self) -> Id {
        product(self.point_dimensions())
    }

    /// Total number of cells: `Π(max_i - min_i)`.
    #[inline]
    pub fn number_of_cells(&self) -> Id {
        product(self.cell_dimensions())
    }

    /// Returns true if `ijk` lies inside the point box.
    pub fn contains_point(&self, ijk: Id3) -> bool {
        ijk.cmpge(self.min).all() && ijk.cmple(self.max).all()
    }
}

impl Default for Extent3 {
    /// A single point at the origin (no cells).
    fn default() -> Self {
        Self {
            min: Id3::ZERO,
            max: Id3::ZERO,
        }
    }
}

#[inline]
fn product(dims: Id3) -> Id {
    dims.x as Id * dims.y as Id * dims.z as Id
}

#[inline]
fn flat_to_index3(index: Id, dims: Id3, min: Id3) -> Id3 {
    let dx = dims.x as Id;
    let dy = dims.y as Id;
    let x = index % dx;
    let y = (index / dx) % dy;
    let z = index / (dx * dy);
    min + Id3::new(x as i32, y as i32, z as i32)
}

#[inline]
fn index3_to_flat(ijk: Id3, dims: Id3, min: Id3) -> Id {
    let rel = ijk - min;
    let dx = dims.x as Id;
    let dy = dims.y as Id;
    rel.x as Id + dx * (rel.y as Id + dy * rel.z as Id)
}

/// Converts a flat point index into its 3D point index.
///
/// `index` must be less than `extent.number_of_points()`.
#[inline]
pub fn flat_index_to_index3(index: Id, extent: &Extent3) -> Id3 {
    flat_to_index3(index, extent.point_dimensions(), extent.min)
}

/// Converts a flat cell index into the 3D index of the cell's lowest point.
///
/// `index` must be less than `extent.number_of_cells()`.
#[inline]
pub fn flat_index_to_index3_cell(index: Id, extent: &Extent3) -> Id3 {
    flat_to_index3(index, extent.cell_dimensions(), extent.min)
}

/// Converts a 3D point index into its flat point index.
///
/// `ijk` must lie inside the extent.
#[inline]
pub fn index3_to_flat_index(ijk: Id3, extent: &Extent3) -> Id {
    index3_to_flat(ijk, extent.point_dimensions(), extent.min)
}

/// Converts the 3D index of a cell's lowest point into its flat cell index.
#[inline]
pub fn index3_to_flat_index_cell(ijk: Id3, extent: &Extent3) -> Id {
    index3_to_flat(ijk, extent.cell_dimensions(), extent.min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_axis_has_no_points() {
        let extent = Extent3::new(Id3::new(0, 3, 0), Id3::new(2, 1, 2));
        assert_eq!(extent.number_of_points(), 0);
        assert_eq!(extent.number_of_cells(), 0);
    }

    #[test]
    fn flat_round_trip_with_negative_min() {
        let extent = Extent3::new(Id3::new(5, -2, -7), Id3::new(20, 4, 10));
        for index in [0, 1, 15, 16, 111, extent.number_of_points() - 1] {
            let ijk = flat_index_to_index3(index, &extent);
            assert!(extent.contains_point(ijk));
            assert_eq!(index3_to_flat_index(ijk, &extent), index);
        }
    }
}
