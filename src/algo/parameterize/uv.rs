//! UV coordinate storage.
//!
//! This module provides the [`UVMap`] type for storing 2D texture coordinates
//! computed for each vertex of a geometry.

use nalgebra::Point2;

use crate::error::Result;
use crate::geometry::BufferAttribute;

/// UV coordinates for geometry vertices.
///
/// Index `i` holds the coordinates of vertex `i`. Values are not restricted to
/// `[0, 1]`: planar projection copies position components straight through,
/// and the texture's wrap mode decides how they are sampled.
///
/// # Example
///
/// ```
/// use triplanar::algo::parameterize::{planar_projection, PlanarOptions};
/// use triplanar::geometry::primitives::box_geometry;
///
/// let door = box_geometry(5.3, 11.0, 0.3).unwrap();
/// let uvs = planar_projection(&door, &PlanarOptions::default()).unwrap();
///
/// assert_eq!(uvs.len(), door.vertex_count());
/// let (min, max) = uvs.bounding_box().unwrap();
/// println!("UV bounds: {:?} to {:?}", min, max);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UVMap {
    coords: Vec<Point2<f64>>,
}

impl UVMap {
    /// Create a new UV map with the given coordinates.
    pub fn new(coords: Vec<Point2<f64>>) -> Self {
        Self { coords }
    }

    /// Copy the coordinates out of a 2-component attribute.
    pub fn from_attribute(attribute: &BufferAttribute) -> Result<Self> {
        attribute.require_item_size(crate::geometry::UV, 2)?;
        Ok(Self {
            coords: (0..attribute.count()).map(|i| attribute.point2(i)).collect(),
        })
    }

    /// Convert into a 2-component attribute.
    pub fn to_attribute(&self) -> BufferAttribute {
        BufferAttribute::from_points2(&self.coords)
    }

    /// Get the UV coordinates for a vertex.
    #[inline]
    pub fn get(&self, vertex: usize) -> Point2<f64> {
        self.coords[vertex]
    }

    /// Get the number of UV coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Get the raw coordinates slice.
    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.coords
    }

    /// Compute the bounding box of the UV coordinates.
    ///
    /// Returns `None` if the UV map is empty.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = *self.coords.first()?;
        Some(
            self.coords
                .iter()
                .fold((first, first), |(min, max), uv| (min.inf(uv), max.sup(uv))),
        )
    }

    /// Compute the total unsigned area in UV space of the given triangles.
    pub fn total_area(&self, faces: &[[usize; 3]]) -> f64 {
        faces
            .iter()
            .map(|face| {
                let p0 = self.coords[face[0]];
                let p1 = self.coords[face[1]];
                let p2 = self.coords[face[2]];
                0.5 * ((p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)).abs()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_map_basic() {
        let coords = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
        ];
        let uv_map = UVMap::new(coords);

        assert_eq!(uv_map.len(), 3);
        assert!(!uv_map.is_empty());
        assert_eq!(uv_map.get(2), Point2::new(0.5, 1.0));

        assert_eq!(uv_map.as_slice()[1], Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_uv_map_attribute_conversion() {
        let uv_map = UVMap::new(vec![Point2::new(1.0, 2.0), Point2::new(3.0, 4.0)]);
        let attribute = uv_map.to_attribute();
        assert_eq!(attribute.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(UVMap::from_attribute(&attribute).unwrap(), uv_map);

        assert!(UVMap::from_attribute(&BufferAttribute::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_uv_map_bounding_box() {
        let coords = vec![
            Point2::new(-1.0, 0.5),
            Point2::new(2.0, -0.5),
            Point2::new(0.5, 3.0),
        ];
        let uv_map = UVMap::new(coords);

        let (min, max) = uv_map.bounding_box().unwrap();
        assert_eq!(min, Point2::new(-1.0, -0.5));
        assert_eq!(max, Point2::new(2.0, 3.0));
        assert!(UVMap::new(Vec::new()).bounding_box().is_none());
    }

    #[test]
    fn test_uv_map_total_area() {
        let coords = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let uv_map = UVMap::new(coords);
        let faces = vec![[0, 1, 2]];

        let area = uv_map.total_area(&faces);
        assert!((area - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_projected_uvs_stay_in_world_units() {
        use crate::algo::parameterize::{planar_projection, PlanarOptions};
        use crate::geometry::primitives::box_geometry;

        let wall = box_geometry(17.0, 15.0, 2.0).unwrap();
        let uvs = planar_projection(&wall, &PlanarOptions::default()).unwrap();
        let (min, max) = uvs.bounding_box().unwrap();
        assert_eq!((min.x, min.y), (-8.5, -7.5));
        assert_eq!((max.x, max.y), (8.5, 7.5));
    }
}
