//! Flat per-vertex attribute buffers.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{GeometryError, Result};

/// A per-vertex attribute stored as a flat array of components.
///
/// Vertex `i` occupies `array[i * item_size .. (i + 1) * item_size]`. Positions
/// and normals use an item size of 3, texture coordinates an item size of 2.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferAttribute {
    array: Vec<f64>,
    item_size: usize,
}

impl BufferAttribute {
    /// Wrap a flat component array.
    ///
    /// Fails if `item_size` is zero or the array length is not a multiple of it.
    pub fn new(array: Vec<f64>, item_size: usize) -> Result<Self> {
        if item_size == 0 {
            return Err(GeometryError::invalid_param(
                "item_size",
                item_size,
                "must be positive",
            ));
        }
        if array.len() % item_size != 0 {
            return Err(GeometryError::MalformedAttribute {
                len: array.len(),
                item_size,
            });
        }
        Ok(Self { array, item_size })
    }

    /// Create an attribute of `count` items with every component zero.
    pub fn zeros(count: usize, item_size: usize) -> Self {
        Self {
            array: vec![0.0; count * item_size],
            item_size: item_size.max(1),
        }
    }

    /// Build a 3-component attribute from points.
    pub fn from_points3(points: &[Point3<f64>]) -> Self {
        Self {
            array: points.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
            item_size: 3,
        }
    }

    /// Build a 3-component attribute from vectors.
    pub fn from_vectors3(vectors: &[Vector3<f64>]) -> Self {
        Self {
            array: vectors.iter().flat_map(|v| [v.x, v.y, v.z]).collect(),
            item_size: 3,
        }
    }

    /// Build a 2-component attribute from points.
    pub fn from_points2(points: &[Point2<f64>]) -> Self {
        Self {
            array: points.iter().flat_map(|p| [p.x, p.y]).collect(),
            item_size: 2,
        }
    }

    /// Number of items (vertices) in the attribute.
    #[inline]
    pub fn count(&self) -> usize {
        self.array.len() / self.item_size
    }

    /// Number of components per item.
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Check if the attribute holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// First component of item `i`.
    #[inline]
    pub fn get_x(&self, i: usize) -> f64 {
        self.array[i * self.item_size]
    }

    /// Second component of item `i`.
    #[inline]
    pub fn get_y(&self, i: usize) -> f64 {
        debug_assert!(self.item_size >= 2);
        self.array[i * self.item_size + 1]
    }

    /// Third component of item `i`.
    #[inline]
    pub fn get_z(&self, i: usize) -> f64 {
        debug_assert!(self.item_size >= 3);
        self.array[i * self.item_size + 2]
    }

    /// Set the first component of item `i`.
    #[inline]
    pub fn set_x(&mut self, i: usize, x: f64) {
        self.array[i * self.item_size] = x;
    }

    /// Set the second component of item `i`.
    #[inline]
    pub fn set_y(&mut self, i: usize, y: f64) {
        debug_assert!(self.item_size >= 2);
        self.array[i * self.item_size + 1] = y;
    }

    /// Set the first two components of item `i`.
    #[inline]
    pub fn set_xy(&mut self, i: usize, x: f64, y: f64) {
        debug_assert!(self.item_size >= 2);
        let base = i * self.item_size;
        self.array[base] = x;
        self.array[base + 1] = y;
    }

    /// Set the first three components of item `i`.
    #[inline]
    pub fn set_xyz(&mut self, i: usize, x: f64, y: f64, z: f64) {
        debug_assert!(self.item_size >= 3);
        let base = i * self.item_size;
        self.array[base] = x;
        self.array[base + 1] = y;
        self.array[base + 2] = z;
    }

    /// Item `i` as a 3D point.
    #[inline]
    pub fn point3(&self, i: usize) -> Point3<f64> {
        Point3::new(self.get_x(i), self.get_y(i), self.get_z(i))
    }

    /// Item `i` as a 3D vector.
    #[inline]
    pub fn vector3(&self, i: usize) -> Vector3<f64> {
        Vector3::new(self.get_x(i), self.get_y(i), self.get_z(i))
    }

    /// Item `i` as a 2D point.
    #[inline]
    pub fn point2(&self, i: usize) -> Point2<f64> {
        Point2::new(self.get_x(i), self.get_y(i))
    }

    /// The flat component array.
    pub fn as_slice(&self) -> &[f64] {
        &self.array
    }

    /// The flat component array, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.array
    }

    /// Append every item of `other`. Item sizes must match.
    pub(crate) fn extend_from(&mut self, other: &BufferAttribute) {
        debug_assert_eq!(self.item_size, other.item_size);
        self.array.extend_from_slice(&other.array);
    }

    /// Check that the attribute has `expected` components per item.
    pub(crate) fn require_item_size(&self, attribute: &'static str, expected: usize) -> Result<()> {
        if self.item_size != expected {
            return Err(GeometryError::InvalidItemSize {
                attribute,
                expected,
                actual: self.item_size,
            });
        }
        Ok(())
    }
}
