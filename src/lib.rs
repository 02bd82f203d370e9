//! # Triplanar
//!
//! Axis-dominant planar UV projection for triangle geometry buffers.
//!
//! Triplanar assigns every vertex of a geometry texture coordinates taken from
//! its own position, projected onto the coordinate plane most perpendicular to
//! its normal. Surfaces aligned with the world axes receive a texture at a
//! uniform world-space scale, so a repeating material tiles across walls,
//! panels and doors without stretching, whatever their dimensions.
//!
//! ## Features
//!
//! - **Planar projection**: [`algo::parameterize::reset_uvs`] rewrites the
//!   `uv` attribute in place, sequentially or in parallel with rayon
//! - **Geometry buffers**: flat `position` / `normal` / `uv` attributes with an
//!   optional triangle index, matching the layout renderers upload
//! - **Primitives**: box, plane and cylinder builders with the usual face
//!   layout and default texture coordinates
//! - **Instancing**: one geometry drawn under many transforms, bakeable into a
//!   single buffer
//! - **File formats**: OBJ load/save, glTF/GLB load, background loading with
//!   progress events
//!
//! ## Quick Start
//!
//! ```
//! use triplanar::prelude::*;
//! use triplanar::geometry::primitives::box_geometry;
//!
//! // A wall 17 wide, 15 tall and 2 deep
//! let mut wall = box_geometry(17.0, 15.0, 2.0).unwrap();
//!
//! // Replace the per-face unit UVs with world-scale ones
//! reset_uvs(&mut wall, &PlanarOptions::default()).unwrap();
//!
//! // The +X face is projected onto the ZY plane
//! let uv = wall.uv().unwrap();
//! assert_eq!((uv.get_x(0), uv.get_y(0)), (1.0, 7.5));
//! ```
//!
//! ## Loading and Saving
//!
//! ```no_run
//! use triplanar::prelude::*;
//!
//! let mut geometries = triplanar::io::load("stall.glb").unwrap();
//! for geometry in &mut geometries {
//!     // Keep authored normals; loaded meshes may also lack a uv attribute.
//!     if geometry.normal().is_none() {
//!         geometry.compute_vertex_normals();
//!     }
//!     geometry.ensure_uv();
//!     reset_uvs(geometry, &PlanarOptions::default()).unwrap();
//! }
//! triplanar::io::save(&geometries, "stall.obj").unwrap();
//! ```
//!
//! ## Projection Rule
//!
//! | Dominant normal axis | UV |
//! |----------------------|----|
//! | X | `(z, y)` |
//! | Y | `(x, z)` |
//! | Z | `(x, y)` |
//!
//! Ties go to the later axis (Z over Y over X), and a zero normal projects
//! onto the XY plane. See [`algo::parameterize::ProjectionAxis`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod io;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use triplanar::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::parameterize::{reset_uvs, PlanarOptions, ProjectionAxis, UVMap};
    pub use crate::algo::Progress;
    pub use crate::error::{GeometryError, Result};
    pub use crate::geometry::{BufferAttribute, Geometry, InstancedGeometry};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
