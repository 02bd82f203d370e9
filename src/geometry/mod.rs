//! Vertex attribute buffers and the geometries built from them.
//!
//! This module provides the buffer-oriented geometry representation that the
//! UV projectors operate on.
//!
//! # Overview
//!
//! - [`BufferAttribute`] - a flat per-vertex array with a fixed item size
//! - [`Geometry`] - `position`, optional `normal` and `uv`, optional index
//! - [`InstancedGeometry`] - one shared geometry with per-instance transforms
//! - [`primitives`] - box, plane and cylinder generators
//!
//! # Example
//!
//! ```
//! use triplanar::geometry::{BufferAttribute, Geometry};
//! use nalgebra::Point3;
//!
//! let geometry = Geometry::from_points(&[
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ])
//! .with_normal(BufferAttribute::new(vec![0.0, 0.0, 1.0].repeat(3), 3).unwrap());
//!
//! assert!(geometry.validate().is_ok());
//! assert_eq!(geometry.triangle_count(), 1);
//! ```

mod attribute;
mod buffer;
mod instanced;
pub mod primitives;

pub use attribute::BufferAttribute;
pub use buffer::{Geometry, NORMAL, POSITION, UV};
pub use instanced::InstancedGeometry;
