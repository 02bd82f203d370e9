//! UV parameterization algorithms.
//!
//! This module computes texture coordinates for geometry vertices.
//!
//! # Available Algorithms
//!
//! - [`reset_uvs`]: axis-dominant planar projection written in place into a
//!   geometry's `uv` attribute
//! - [`planar_projection`]: the same projection returned as a [`UVMap`]
//!
//! # Example
//!
//! ```
//! use triplanar::algo::parameterize::{reset_uvs, PlanarOptions};
//! use triplanar::geometry::primitives::box_geometry;
//!
//! let mut pillar = box_geometry(2.0, 14.7, 0.3).unwrap();
//! reset_uvs(&mut pillar, &PlanarOptions::default()).unwrap();
//!
//! for i in 0..pillar.vertex_count() {
//!     let uv = pillar.uv().unwrap().point2(i);
//!     println!("Vertex {}: u={:.3}, v={:.3}", i, uv.x, uv.y);
//! }
//! ```

mod planar;
mod uv;

pub use planar::{
    planar_projection, project_vertex, reset_buffer_uvs, reset_uvs, reset_uvs_with_progress,
    PlanarOptions, ProjectionAxis,
};
pub use uv::UVMap;
