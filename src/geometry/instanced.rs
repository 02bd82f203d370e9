//! One geometry drawn several times with per-instance transforms.

use nalgebra::Matrix4;

use crate::error::{GeometryError, Result};

use super::buffer::Geometry;

/// A shared local-space geometry plus one affine transform per instance.
///
/// Operations that edit vertex attributes, such as UV reprojection, act on the
/// shared geometry and therefore see local-space positions. [`bake`] produces
/// the world-space result.
///
/// [`bake`]: InstancedGeometry::bake
#[derive(Debug, Clone)]
pub struct InstancedGeometry {
    geometry: Geometry,
    transforms: Vec<Matrix4<f64>>,
}

impl InstancedGeometry {
    /// Create `count` instances of `geometry`, all with the identity transform.
    pub fn new(geometry: Geometry, count: usize) -> Self {
        Self {
            geometry,
            transforms: vec![Matrix4::identity(); count],
        }
    }

    /// Create instances from explicit transforms.
    pub fn with_transforms(geometry: Geometry, transforms: Vec<Matrix4<f64>>) -> Self {
        Self {
            geometry,
            transforms,
        }
    }

    /// Number of instances.
    pub fn count(&self) -> usize {
        self.transforms.len()
    }

    /// The shared geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The shared geometry, mutably.
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Transform of instance `i`.
    pub fn matrix_at(&self, i: usize) -> Option<&Matrix4<f64>> {
        self.transforms.get(i)
    }

    /// Set the transform of instance `i`.
    pub fn set_matrix_at(&mut self, i: usize, matrix: Matrix4<f64>) -> Result<()> {
        let count = self.transforms.len();
        let slot = self.transforms.get_mut(i).ok_or_else(|| {
            GeometryError::InvalidParameter {
                name: "instance",
                value: i.to_string(),
                reason: if count == 0 {
                    "geometry has no instances"
                } else {
                    "instance index out of range"
                },
            }
        })?;
        *slot = matrix;
        Ok(())
    }

    /// Produce a single geometry with one transformed copy per instance.
    ///
    /// The result keeps the shared geometry's name.
    pub fn bake(&self) -> Result<Geometry> {
        let copies: Vec<Geometry> = self
            .transforms
            .iter()
            .map(|matrix| {
                let mut copy = self.geometry.clone();
                copy.apply_matrix(matrix);
                copy
            })
            .collect();

        let mut baked = Geometry::merge(&copies)?;
        baked.set_name(self.geometry.name().map(str::to_owned));
        Ok(baked)
    }
}
