//! Indexed triangle geometry built from attribute buffers.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::algo::parameterize::UVMap;
use crate::error::{GeometryError, Result};

use super::attribute::BufferAttribute;

/// Name of the position attribute.
pub const POSITION: &str = "position";
/// Name of the normal attribute.
pub const NORMAL: &str = "normal";
/// Name of the texture coordinate attribute.
pub const UV: &str = "uv";

/// Triangle geometry stored as parallel per-vertex attribute buffers.
///
/// `position` is always present. `normal` and `uv` are optional, but when
/// present they hold exactly one item per position. An optional index buffer
/// lists triangle corners three at a time; without it, every three consecutive
/// vertices form a triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub(crate) name: Option<String>,
    pub(crate) position: BufferAttribute,
    pub(crate) normal: Option<BufferAttribute>,
    pub(crate) uv: Option<BufferAttribute>,
    pub(crate) index: Option<Vec<u32>>,
}

impl Geometry {
    /// Create a geometry from a 3-component position attribute.
    pub fn new(position: BufferAttribute) -> Result<Self> {
        position.require_item_size(POSITION, 3)?;
        Ok(Self {
            name: None,
            position,
            normal: None,
            uv: None,
            index: None,
        })
    }

    /// Create a geometry from a list of points.
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        Self {
            name: None,
            position: BufferAttribute::from_points3(points),
            normal: None,
            uv: None,
            index: None,
        }
    }

    /// Attach a normal attribute.
    pub fn with_normal(mut self, normal: BufferAttribute) -> Self {
        self.normal = Some(normal);
        self
    }

    /// Attach a texture coordinate attribute.
    pub fn with_uv(mut self, uv: BufferAttribute) -> Self {
        self.uv = Some(uv);
        self
    }

    /// Attach a triangle index buffer.
    pub fn with_index(mut self, index: Vec<u32>) -> Self {
        self.index = Some(index);
        self
    }

    /// Attach a name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The geometry's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set or clear the name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// The position attribute.
    pub fn position(&self) -> &BufferAttribute {
        &self.position
    }

    /// The position attribute, mutably.
    pub fn position_mut(&mut self) -> &mut BufferAttribute {
        &mut self.position
    }

    /// The normal attribute, if present.
    pub fn normal(&self) -> Option<&BufferAttribute> {
        self.normal.as_ref()
    }

    /// The normal attribute, mutably.
    pub fn normal_mut(&mut self) -> Option<&mut BufferAttribute> {
        self.normal.as_mut()
    }

    /// Replace the normal attribute.
    pub fn set_normal(&mut self, normal: Option<BufferAttribute>) {
        self.normal = normal;
    }

    /// The texture coordinate attribute, if present.
    pub fn uv(&self) -> Option<&BufferAttribute> {
        self.uv.as_ref()
    }

    /// The texture coordinate attribute, mutably.
    pub fn uv_mut(&mut self) -> Option<&mut BufferAttribute> {
        self.uv.as_mut()
    }

    /// Replace the texture coordinate attribute.
    pub fn set_uv(&mut self, uv: Option<BufferAttribute>) {
        self.uv = uv;
    }

    /// The index buffer, if the geometry is indexed.
    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    /// Replace the index buffer.
    pub fn set_index(&mut self, index: Option<Vec<u32>>) {
        self.index = index;
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.position.count()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Check if the geometry has an index buffer.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Triangle corners as vertex indices.
    ///
    /// Trailing corners that do not complete a triangle are ignored.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        match &self.index {
            Some(index) => index
                .chunks_exact(3)
                .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
                .collect(),
            None => (0..self.vertex_count() / 3)
                .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
                .collect(),
        }
    }

    /// Check that every attribute matches the position count and has the
    /// right item size, and that every index is in range.
    pub fn validate(&self) -> Result<()> {
        self.position.require_item_size(POSITION, 3)?;
        let expected = self.vertex_count();

        if let Some(normal) = &self.normal {
            normal.require_item_size(NORMAL, 3)?;
            check_count(NORMAL, expected, normal.count())?;
        }
        if let Some(uv) = &self.uv {
            uv.require_item_size(UV, 2)?;
            check_count(UV, expected, uv.count())?;
        }
        if let Some(index) = &self.index {
            if index.len() % 3 != 0 {
                return Err(GeometryError::invalid_param(
                    "index",
                    index.len(),
                    "length must be a multiple of 3",
                ));
            }
            if let Some(&bad) = index.iter().find(|&&i| i as usize >= expected) {
                return Err(GeometryError::InvalidIndex {
                    index: bad as usize,
                    vertex_count: expected,
                });
            }
        }
        Ok(())
    }

    /// Make sure a texture coordinate attribute exists, creating a zeroed one
    /// if the geometry has none.
    pub fn ensure_uv(&mut self) -> &mut BufferAttribute {
        let count = self.vertex_count();
        self.uv.get_or_insert_with(|| BufferAttribute::zeros(count, 2))
    }

    /// Replace the texture coordinates with the contents of a UV map.
    pub fn set_uvs(&mut self, uvs: &UVMap) -> Result<()> {
        check_count(UV, self.vertex_count(), uvs.len())?;
        self.uv = Some(uvs.to_attribute());
        Ok(())
    }

    /// Recompute vertex normals from the triangles.
    ///
    /// Each vertex receives the sum of the unnormalized cross products of its
    /// incident triangles, so larger triangles weigh more. Vertices that touch
    /// no triangle, or only degenerate ones, get a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vector3::<f64>::zeros(); self.vertex_count()];

        for [a, b, c] in self.triangles() {
            if a >= accum.len() || b >= accum.len() || c >= accum.len() {
                continue;
            }
            let pa = self.position.point3(a);
            let pb = self.position.point3(b);
            let pc = self.position.point3(c);
            let n = (pc - pb).cross(&(pa - pb));
            accum[a] += n;
            accum[b] += n;
            accum[c] += n;
        }

        let normals: Vec<Vector3<f64>> = accum
            .into_iter()
            .map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros))
            .collect();
        self.normal = Some(BufferAttribute::from_vectors3(&normals));
    }

    /// Transform positions and normals by a 4x4 affine matrix.
    ///
    /// Normals are transformed by the inverse transpose of the linear part and
    /// renormalized. Texture coordinates are left alone.
    pub fn apply_matrix(&mut self, matrix: &Matrix4<f64>) {
        for i in 0..self.position.count() {
            let p = matrix.transform_point(&self.position.point3(i));
            self.position.set_xyz(i, p.x, p.y, p.z);
        }

        if let Some(normal) = &mut self.normal {
            let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
            let normal_matrix = linear
                .try_inverse()
                .map(|m| m.transpose())
                .unwrap_or(linear);
            for i in 0..normal.count() {
                let n = (normal_matrix * normal.vector3(i))
                    .try_normalize(1e-12)
                    .unwrap_or_else(Vector3::zeros);
                normal.set_xyz(i, n.x, n.y, n.z);
            }
        }
    }

    /// Axis-aligned bounding box of the positions.
    ///
    /// Returns `None` if the geometry has no vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.position.is_empty() {
            return None;
        }

        let mut min = self.position.point3(0);
        let mut max = min;
        for i in 1..self.vertex_count() {
            let p = self.position.point3(i);
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Some((min, max))
    }

    /// Concatenate several geometries into one.
    ///
    /// An optional attribute survives only if every part carries it. If any
    /// part is indexed the result is indexed, with non-indexed parts receiving
    /// sequential indices.
    pub fn merge(parts: &[Geometry]) -> Result<Geometry> {
        if parts.is_empty() {
            return Err(GeometryError::invalid_param(
                "parts",
                0,
                "at least one geometry is required",
            ));
        }
        for part in parts {
            part.validate()?;
        }

        let keep_normal = parts.iter().all(|g| g.normal.is_some());
        let keep_uv = parts.iter().all(|g| g.uv.is_some());
        let indexed = parts.iter().any(|g| g.index.is_some());

        let mut position = BufferAttribute::zeros(0, 3);
        let mut normal = keep_normal.then(|| BufferAttribute::zeros(0, 3));
        let mut uv = keep_uv.then(|| BufferAttribute::zeros(0, 2));
        let mut index = indexed.then(Vec::new);

        for part in parts {
            let offset = position.count() as u32;
            position.extend_from(&part.position);
            if let (Some(dst), Some(src)) = (normal.as_mut(), part.normal.as_ref()) {
                dst.extend_from(src);
            }
            if let (Some(dst), Some(src)) = (uv.as_mut(), part.uv.as_ref()) {
                dst.extend_from(src);
            }
            if let Some(dst) = index.as_mut() {
                match &part.index {
                    Some(src) => dst.extend(src.iter().map(|&i| i + offset)),
                    None => dst.extend((0..part.vertex_count() as u32).map(|i| i + offset)),
                }
            }
        }

        log::debug!(
            "merged {} geometries into {} vertices",
            parts.len(),
            position.count()
        );

        Ok(Geometry {
            name: None,
            position,
            normal,
            uv,
            index,
        })
    }
}

fn check_count(attribute: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GeometryError::AttributeLengthMismatch {
            attribute,
            expected,
            actual,
        });
    }
    Ok(())
}
