//! Procedural primitive geometries.
//!
//! Vertex order, normals and default texture coordinates follow the layout
//! common to WebGL engines (box faces ordered +X, -X, +Y, -Y, +Z, -Z; planes in
//! the XY plane facing +Z; cylinders centered on the origin along Y), so UVs
//! reprojected here agree with the same operation done on engine-built meshes.
//!
//! # Example
//!
//! ```
//! use triplanar::geometry::primitives::box_geometry;
//!
//! let wall = box_geometry(17.0, 15.0, 2.0).unwrap();
//! assert_eq!(wall.vertex_count(), 24);
//! assert_eq!(wall.triangle_count(), 12);
//! ```

use std::f64::consts::TAU;

use nalgebra::Vector3;

use crate::error::{GeometryError, Result};

use super::attribute::BufferAttribute;
use super::buffer::Geometry;

/// Accumulates flat attribute arrays while a primitive is generated.
#[derive(Default)]
struct Builder {
    positions: Vec<f64>,
    normals: Vec<f64>,
    uvs: Vec<f64>,
    indices: Vec<u32>,
}

impl Builder {
    fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    fn push(&mut self, position: [f64; 3], normal: [f64; 3], uv: [f64; 2]) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        self.uvs.extend_from_slice(&uv);
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn finish(self, name: &str) -> Result<Geometry> {
        let geometry = Geometry::new(BufferAttribute::new(self.positions, 3)?)?
            .with_normal(BufferAttribute::new(self.normals, 3)?)
            .with_uv(BufferAttribute::new(self.uvs, 2)?)
            .with_index(self.indices)
            .with_name(name);
        debug_assert!(geometry.validate().is_ok());
        Ok(geometry)
    }

    /// Emit one subdivided face of a box.
    ///
    /// `u`, `v` and `w` are axis indices; the face spans `u` and `v` and sits
    /// at `depth / 2` along `w`.
    fn box_face(
        &mut self,
        (u, v, w): (usize, usize, usize),
        (udir, vdir): (f64, f64),
        (width, height, depth): (f64, f64, f64),
        (grid_x, grid_y): (u32, u32),
    ) {
        let segment_width = width / grid_x as f64;
        let segment_height = height / grid_y as f64;
        let width_half = width / 2.0;
        let height_half = height / 2.0;
        let depth_half = depth / 2.0;
        let grid_x1 = grid_x + 1;
        let start = self.vertex_count();

        for iy in 0..=grid_y {
            let y = iy as f64 * segment_height - height_half;
            for ix in 0..=grid_x {
                let x = ix as f64 * segment_width - width_half;

                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = depth_half;

                let mut normal = [0.0; 3];
                normal[w] = if depth > 0.0 { 1.0 } else { -1.0 };

                let uv = [
                    ix as f64 / grid_x as f64,
                    1.0 - iy as f64 / grid_y as f64,
                ];
                self.push(position, normal, uv);
            }
        }

        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = start + ix + grid_x1 * iy;
                let b = start + ix + grid_x1 * (iy + 1);
                let c = start + (ix + 1) + grid_x1 * (iy + 1);
                let d = start + (ix + 1) + grid_x1 * iy;
                self.triangle(a, b, d);
                self.triangle(b, c, d);
            }
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(GeometryError::invalid_param(
            name,
            value,
            "must be positive and finite",
        ));
    }
    Ok(())
}

fn require_segments(name: &'static str, value: u32, min: u32) -> Result<()> {
    if value < min {
        return Err(GeometryError::invalid_param(
            name,
            value,
            if min == 3 {
                "must be at least 3"
            } else {
                "must be at least 1"
            },
        ));
    }
    Ok(())
}

/// An axis-aligned box centered on the origin with one segment per side.
pub fn box_geometry(width: f64, height: f64, depth: f64) -> Result<Geometry> {
    box_geometry_segments(width, height, depth, 1, 1, 1)
}

/// An axis-aligned box centered on the origin with subdivided faces.
///
/// Each face has its own vertices, so corner vertices are duplicated and carry
/// the normal of their face.
pub fn box_geometry_segments(
    width: f64,
    height: f64,
    depth: f64,
    width_segments: u32,
    height_segments: u32,
    depth_segments: u32,
) -> Result<Geometry> {
    require_positive("width", width)?;
    require_positive("height", height)?;
    require_positive("depth", depth)?;
    require_segments("width_segments", width_segments, 1)?;
    require_segments("height_segments", height_segments, 1)?;
    require_segments("depth_segments", depth_segments, 1)?;

    let (x, y, z) = (0, 1, 2);
    let (ws, hs, ds) = (width_segments, height_segments, depth_segments);
    let mut builder = Builder::default();

    // +X, -X
    builder.box_face((z, y, x), (-1.0, -1.0), (depth, height, width), (ds, hs));
    builder.box_face((z, y, x), (1.0, -1.0), (depth, height, -width), (ds, hs));
    // +Y, -Y
    builder.box_face((x, z, y), (1.0, 1.0), (width, depth, height), (ws, ds));
    builder.box_face((x, z, y), (1.0, -1.0), (width, depth, -height), (ws, ds));
    // +Z, -Z
    builder.box_face((x, y, z), (1.0, -1.0), (width, height, depth), (ws, hs));
    builder.box_face((x, y, z), (-1.0, -1.0), (width, height, -depth), (ws, hs));

    builder.finish("box")
}

/// A rectangle in the XY plane facing +Z, centered on the origin.
pub fn plane_geometry(width: f64, height: f64) -> Result<Geometry> {
    plane_geometry_segments(width, height, 1, 1)
}

/// A subdivided rectangle in the XY plane facing +Z, centered on the origin.
pub fn plane_geometry_segments(
    width: f64,
    height: f64,
    width_segments: u32,
    height_segments: u32,
) -> Result<Geometry> {
    require_positive("width", width)?;
    require_positive("height", height)?;
    require_segments("width_segments", width_segments, 1)?;
    require_segments("height_segments", height_segments, 1)?;

    let mut builder = Builder::default();
    let (grid_x, grid_y) = (width_segments, height_segments);
    let grid_x1 = grid_x + 1;
    let segment_width = width / grid_x as f64;
    let segment_height = height / grid_y as f64;

    for iy in 0..=grid_y {
        let y = iy as f64 * segment_height - height / 2.0;
        for ix in 0..=grid_x {
            let x = ix as f64 * segment_width - width / 2.0;
            builder.push(
                [x, -y, 0.0],
                [0.0, 0.0, 1.0],
                [ix as f64 / grid_x as f64, 1.0 - iy as f64 / grid_y as f64],
            );
        }
    }

    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + grid_x1 * iy;
            let b = ix + grid_x1 * (iy + 1);
            let c = (ix + 1) + grid_x1 * (iy + 1);
            let d = (ix + 1) + grid_x1 * iy;
            builder.triangle(a, b, d);
            builder.triangle(b, c, d);
        }
    }

    builder.finish("plane")
}

/// A capped cylinder (or truncated cone) along Y, centered on the origin.
pub fn cylinder_geometry(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: u32,
) -> Result<Geometry> {
    cylinder_geometry_segments(radius_top, radius_bottom, height, radial_segments, 1, false)
}

/// A cylinder along Y with control over height subdivision and caps.
///
/// A radius of zero produces a cone tip; no cap is generated at a zero-radius
/// end.
pub fn cylinder_geometry_segments(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: u32,
    height_segments: u32,
    open_ended: bool,
) -> Result<Geometry> {
    if !(radius_top >= 0.0 && radius_bottom >= 0.0) || radius_top + radius_bottom <= 0.0 {
        return Err(GeometryError::invalid_param(
            "radius",
            format!("{}/{}", radius_top, radius_bottom),
            "radii must be non-negative and not both zero",
        ));
    }
    require_positive("height", height)?;
    require_segments("radial_segments", radial_segments, 3)?;
    require_segments("height_segments", height_segments, 1)?;

    let mut builder = Builder::default();
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    // Torso
    let mut rows: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);
    for y in 0..=height_segments {
        let v = y as f64 / height_segments as f64;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        let mut row = Vec::with_capacity(radial_segments as usize + 1);

        for x in 0..=radial_segments {
            let u = x as f64 / radial_segments as f64;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = Vector3::new(sin, slope, cos).normalize();
            row.push(builder.vertex_count());
            builder.push(
                [radius * sin, -v * height + half_height, radius * cos],
                [normal.x, normal.y, normal.z],
                [u, 1.0 - v],
            );
        }
        rows.push(row);
    }

    for x in 0..radial_segments as usize {
        for y in 0..height_segments as usize {
            let a = rows[y][x];
            let b = rows[y + 1][x];
            let c = rows[y + 1][x + 1];
            let d = rows[y][x + 1];
            if radius_top > 0.0 || y != 0 {
                builder.triangle(a, b, d);
            }
            if radius_bottom > 0.0 || y != height_segments as usize - 1 {
                builder.triangle(b, c, d);
            }
        }
    }

    if !open_ended {
        if radius_top > 0.0 {
            cylinder_cap(&mut builder, true, radius_top, half_height, radial_segments);
        }
        if radius_bottom > 0.0 {
            cylinder_cap(&mut builder, false, radius_bottom, half_height, radial_segments);
        }
    }

    builder.finish("cylinder")
}

fn cylinder_cap(builder: &mut Builder, top: bool, radius: f64, half_height: f64, segments: u32) {
    let sign = if top { 1.0 } else { -1.0 };
    let y = half_height * sign;

    // One center vertex per segment so every cap triangle has its own apex.
    let center_start = builder.vertex_count();
    for _ in 0..segments {
        builder.push([0.0, y, 0.0], [0.0, sign, 0.0], [0.5, 0.5]);
    }

    let rim_start = builder.vertex_count();
    for x in 0..=segments {
        let u = x as f64 / segments as f64;
        let (sin, cos) = (u * TAU).sin_cos();
        builder.push(
            [radius * sin, y, radius * cos],
            [0.0, sign, 0.0],
            [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
        );
    }

    for x in 0..segments {
        let c = center_start + x;
        let i = rim_start + x;
        if top {
            builder.triangle(i, i + 1, c);
        } else {
            builder.triangle(i + 1, i, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_box_layout() {
        let geometry = box_geometry(2.0, 4.0, 6.0).unwrap();
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.index().unwrap().len(), 36);

        let normals = geometry.normal().unwrap();
        let expected = [
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ];
        for (face, n) in expected.iter().enumerate() {
            for corner in 0..4 {
                assert_eq!(normals.vector3(face * 4 + corner), *n, "face {}", face);
            }
        }

        // First +X vertex sits at the top-front corner of that face.
        assert_eq!(geometry.position().point3(0), Point3::new(1.0, 2.0, 3.0));

        let (min, max) = geometry.bounding_box().unwrap();
        assert_eq!(min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_box_vertices_lie_on_their_face() {
        let geometry = box_geometry(17.0, 15.0, 2.0).unwrap();
        let half = Vector3::new(8.5, 7.5, 1.0);
        let positions = geometry.position();
        let normals = geometry.normal().unwrap();
        for i in 0..geometry.vertex_count() {
            let p = positions.vector3(i);
            let n = normals.vector3(i);
            assert!((p.dot(&n) - half.dot(&n.abs())).abs() < 1e-12, "vertex {}", i);
        }
    }

    #[test]
    fn test_box_segments() {
        let geometry = box_geometry_segments(1.0, 1.0, 1.0, 2, 3, 4).unwrap();
        // Per face: (segments_u + 1) * (segments_v + 1) vertices.
        assert_eq!(geometry.vertex_count(), 2 * (3 * 4) + 2 * (3 * 5) + 2 * (4 * 5));
        assert_eq!(geometry.triangle_count(), 2 * 2 * (4 * 3 + 2 * 4 + 2 * 3));
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_plane_layout() {
        let geometry = plane_geometry(50.0, 50.0).unwrap();
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.index().unwrap(), &[0, 2, 1, 2, 3, 1]);
        assert_eq!(geometry.position().point3(0), Point3::new(-25.0, 25.0, 0.0));
        assert_eq!(geometry.uv().unwrap().as_slice(), &[0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_cylinder_layout() {
        let geometry = cylinder_geometry(0.07, 0.07, 0.5, 16).unwrap();
        assert!(geometry.validate().is_ok());
        // Torso (2 rows of 17) + two caps of (16 centers + 17 rim).
        assert_eq!(geometry.vertex_count(), 2 * 17 + 2 * (16 + 17));
        assert_eq!(geometry.triangle_count(), 2 * 16 + 2 * 16);

        let (min, max) = geometry.bounding_box().unwrap();
        assert!((min.y + 0.25).abs() < 1e-12);
        assert!((max.y - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_cone_has_single_cap() {
        let geometry = cylinder_geometry(0.0, 1.0, 2.0, 8).unwrap();
        assert_eq!(geometry.vertex_count(), 2 * 9 + (8 + 9));
        // Top row triangles collapse at the tip and are skipped.
        assert_eq!(geometry.triangle_count(), 8 + 8);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(box_geometry(0.0, 1.0, 1.0).is_err());
        assert!(box_geometry(1.0, f64::NAN, 1.0).is_err());
        assert!(plane_geometry_segments(1.0, 1.0, 0, 1).is_err());
        assert!(cylinder_geometry(1.0, 1.0, 1.0, 2).is_err());
        assert!(cylinder_geometry(0.0, 0.0, 1.0, 8).is_err());
        assert!(cylinder_geometry(-1.0, 1.0, 1.0, 8).is_err());
    }
}
