//! # dax-types
//!
//! Shared types, index math, and error types for the Dax execution layer.
//!
//! This crate has no execution logic. It defines the vocabulary that
//! the grid, device, and control crates share: identifiers, 3D extents,
//! scheduling domains, read-only array portals, and [`DaxError`].

pub mod domain;
pub mod element;
pub mod error;
pub mod extent;
pub mod portal;
pub mod scalar;

pub use domain::Domain;
pub use element::Element;
pub use error::{DaxError, DaxResult};
pub use extent::Extent3;
pub use portal::ArrayPortal;
pub use scalar::{make_id3, make_vector3, Id, Id3, Scalar, Vector3};
