//! Scalar, index, and vector aliases.
//!
//! `Scalar` is `f32` so point coordinates keep the layout device memory
//! expects. Flat indices and counts are `usize`; 3D indices are signed
//! because extents may start below zero.

/// The floating-point type used for coordinates and field values.
pub type Scalar = f32;

/// Flat index or count (points, cells, array entries, work items).
pub type Id = usize;

/// Signed 3D index into a structured extent.
pub type Id3 = glam::IVec3;

/// A point coordinate or any 3-component vector of `Scalar`.
pub type Vector3 = glam::Vec3;

/// Builds an [`Id3`] from its components.
#[inline]
pub fn make_id3(x: i32, y: i32, z: i32) -> Id3 {
    Id3::new(x, y, z)
}

/// Builds a [`Vector3`] from its components.
#[inline]
pub fn make_vector3(x: Scalar, y: Scalar, z: Scalar) -> Vector3 {
    Vector3::new(x, y, z)
}
