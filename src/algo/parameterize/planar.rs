//! Axis-dominant planar UV projection.
//!
//! Each vertex is projected onto the coordinate plane its normal faces most
//! directly, which approximates tri-planar texturing with a single UV channel:
//!
//! | Dominant axis | UV |
//! |---------------|----|
//! | X | `(z, y)` |
//! | Y | `(x, z)` |
//! | Z | `(x, y)` |
//!
//! The dominant axis is chosen by three greater-or-equal tests evaluated in X,
//! Y, Z order where each passing test replaces the previous choice. Ties are
//! therefore won by the later axis: a normal of `(1, 1, 0)` projects along Y,
//! and a zero normal projects along Z.
//!
//! Positions are used as-is, so the resulting coordinates are in the same
//! units as the geometry and usually far outside `[0, 1]`; a repeating
//! texture tiles once per unit.

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::{Point2, Point3, Vector3};
use rayon::prelude::*;

use crate::algo::Progress;
use crate::error::{GeometryError, Result};
use crate::geometry::{BufferAttribute, Geometry, NORMAL, POSITION, UV};

use super::UVMap;

/// Vertices per work unit. Progress is reported once per block.
const BLOCK_SIZE: usize = 4096;

const PROGRESS_MESSAGE: &str = "Projecting UVs";

/// The coordinate axis a surface faces most directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionAxis {
    /// Facing ±X; projects onto the ZY plane.
    X,
    /// Facing ±Y; projects onto the XZ plane.
    Y,
    /// Facing ±Z; projects onto the XY plane.
    Z,
}

impl ProjectionAxis {
    /// Select the projection axis for a vertex normal.
    ///
    /// The normal does not need to be unit length. Returns `None` only when a
    /// component is NaN, since no comparison then succeeds.
    ///
    /// # Example
    ///
    /// ```
    /// use triplanar::algo::parameterize::ProjectionAxis;
    /// use nalgebra::Vector3;
    ///
    /// let axis = ProjectionAxis::from_normal(&Vector3::new(-0.9, 0.1, 0.3));
    /// assert_eq!(axis, Some(ProjectionAxis::X));
    /// // Ties go to the later axis.
    /// let axis = ProjectionAxis::from_normal(&Vector3::new(1.0, 1.0, 0.0));
    /// assert_eq!(axis, Some(ProjectionAxis::Y));
    /// assert_eq!(ProjectionAxis::from_normal(&Vector3::zeros()), Some(ProjectionAxis::Z));
    /// ```
    pub fn from_normal(normal: &Vector3<f64>) -> Option<Self> {
        let nx = normal.x.abs();
        let ny = normal.y.abs();
        let nz = normal.z.abs();

        let mut axis = None;
        if nx >= ny && nx >= nz {
            axis = Some(ProjectionAxis::X);
        }
        if ny >= nx && ny >= nz {
            axis = Some(ProjectionAxis::Y);
        }
        if nz >= nx && nz >= ny {
            axis = Some(ProjectionAxis::Z);
        }
        axis
    }

    /// Project a position onto the plane orthogonal to this axis.
    #[inline]
    pub fn project(self, position: &Point3<f64>) -> Point2<f64> {
        match self {
            ProjectionAxis::X => Point2::new(position.z, position.y),
            ProjectionAxis::Y => Point2::new(position.x, position.z),
            ProjectionAxis::Z => Point2::new(position.x, position.y),
        }
    }
}

/// Compute the planar UV of a single vertex.
///
/// A normal with a NaN component maps to the origin.
#[inline]
pub fn project_vertex(position: &Point3<f64>, normal: &Vector3<f64>) -> Point2<f64> {
    ProjectionAxis::from_normal(normal).map_or_else(Point2::origin, |axis| axis.project(position))
}

/// Options for planar projection.
#[derive(Debug, Clone)]
pub struct PlanarOptions {
    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for PlanarOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl PlanarOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Overwrite a geometry's `uv` attribute with planar-projected coordinates.
///
/// The geometry must carry `normal` and `uv` attributes with one item per
/// position. Nothing is written if validation fails.
///
/// # Example
///
/// ```
/// use triplanar::algo::parameterize::{reset_uvs, PlanarOptions};
/// use triplanar::geometry::primitives::box_geometry;
/// use nalgebra::Point2;
///
/// let mut wall = box_geometry(17.0, 15.0, 2.0).unwrap();
/// reset_uvs(&mut wall, &PlanarOptions::default()).unwrap();
///
/// // Vertex 0 lies on the +X face at (8.5, 7.5, 1.0).
/// assert_eq!(wall.uv().unwrap().point2(0), Point2::new(1.0, 7.5));
/// ```
pub fn reset_uvs(geometry: &mut Geometry, options: &PlanarOptions) -> Result<()> {
    reset_uvs_impl(geometry, options, None)
}

/// Like [`reset_uvs`], reporting progress once per block of vertices.
pub fn reset_uvs_with_progress(
    geometry: &mut Geometry,
    options: &PlanarOptions,
    progress: &Progress,
) -> Result<()> {
    reset_uvs_impl(geometry, options, Some(progress))
}

fn reset_uvs_impl(
    geometry: &mut Geometry,
    options: &PlanarOptions,
    progress: Option<&Progress>,
) -> Result<()> {
    let normal = geometry
        .normal
        .as_ref()
        .ok_or(GeometryError::MissingAttribute { attribute: NORMAL })?;
    let uv = geometry
        .uv
        .as_mut()
        .ok_or(GeometryError::MissingAttribute { attribute: UV })?;

    log::debug!(
        "resetting UVs of {} ({} vertices)",
        geometry.name.as_deref().unwrap_or("unnamed geometry"),
        geometry.position.count()
    );

    project_buffers(&geometry.position, normal, uv, options, progress)
}

/// Overwrite a standalone `uv` buffer from position and normal buffers.
///
/// Use this when the attributes are not held in a [`Geometry`]. The three
/// buffers must have item sizes 3, 3 and 2 and the same item count.
pub fn reset_buffer_uvs(
    position: &BufferAttribute,
    normal: &BufferAttribute,
    uv: &mut BufferAttribute,
    options: &PlanarOptions,
) -> Result<()> {
    project_buffers(position, normal, uv, options, None)
}

/// Compute planar UVs without modifying the geometry.
///
/// Only `position` and `normal` are required.
pub fn planar_projection(geometry: &Geometry, options: &PlanarOptions) -> Result<UVMap> {
    let position = &geometry.position;
    let normal = geometry
        .normal
        .as_ref()
        .ok_or(GeometryError::MissingAttribute { attribute: NORMAL })?;
    check_sources(position, normal)?;

    let project = |i: usize| project_vertex(&position.point3(i), &normal.vector3(i));
    let coords: Vec<Point2<f64>> = if options.parallel {
        (0..position.count()).into_par_iter().map(project).collect()
    } else {
        (0..position.count()).map(project).collect()
    };

    Ok(UVMap::new(coords))
}

fn check_sources(position: &BufferAttribute, normal: &BufferAttribute) -> Result<()> {
    position.require_item_size(POSITION, 3)?;
    normal.require_item_size(NORMAL, 3)?;
    if normal.count() != position.count() {
        return Err(GeometryError::AttributeLengthMismatch {
            attribute: NORMAL,
            expected: position.count(),
            actual: normal.count(),
        });
    }
    Ok(())
}

fn project_buffers(
    position: &BufferAttribute,
    normal: &BufferAttribute,
    uv: &mut BufferAttribute,
    options: &PlanarOptions,
    progress: Option<&Progress>,
) -> Result<()> {
    check_sources(position, normal)?;
    uv.require_item_size(UV, 2)?;
    let total = position.count();
    if uv.count() != total {
        return Err(GeometryError::AttributeLengthMismatch {
            attribute: UV,
            expected: total,
            actual: uv.count(),
        });
    }

    if let Some(progress) = progress {
        progress.report(0, total, PROGRESS_MESSAGE);
    }
    let completed = AtomicUsize::new(0);

    let project_block = |(block, out): (usize, &mut [f64])| {
        let start = block * BLOCK_SIZE;
        for (offset, item) in out.chunks_exact_mut(2).enumerate() {
            let i = start + offset;
            let uv = project_vertex(&position.point3(i), &normal.vector3(i));
            item[0] = uv.x;
            item[1] = uv.y;
        }

        if let Some(progress) = progress {
            let done = completed.fetch_add(out.len() / 2, Ordering::Relaxed) + out.len() / 2;
            progress.report(done, total, PROGRESS_MESSAGE);
        }
    };

    if options.parallel {
        uv.as_mut_slice()
            .par_chunks_mut(2 * BLOCK_SIZE)
            .enumerate()
            .for_each(project_block);
    } else {
        uv.as_mut_slice()
            .chunks_mut(2 * BLOCK_SIZE)
            .enumerate()
            .for_each(project_block);
    }

    if let Some(progress) = progress {
        progress.finish(total, PROGRESS_MESSAGE);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::{box_geometry, box_geometry_segments, cylinder_geometry};
    use std::sync::{Arc, Mutex};

    fn single_vertex(position: [f64; 3], normal: [f64; 3]) -> Geometry {
        Geometry::from_points(&[Point3::from(position)])
            .with_normal(BufferAttribute::new(normal.to_vec(), 3).unwrap())
            .with_uv(BufferAttribute::zeros(1, 2))
    }

    fn project_one(position: [f64; 3], normal: [f64; 3]) -> Point2<f64> {
        let mut geometry = single_vertex(position, normal);
        reset_uvs(&mut geometry, &PlanarOptions::default()).unwrap();
        geometry.uv().unwrap().point2(0)
    }

    #[test]
    fn test_facing_x() {
        assert_eq!(project_one([2.0, 3.0, 4.0], [1.0, 0.0, 0.0]), Point2::new(4.0, 3.0));
        assert_eq!(project_one([2.0, 3.0, 4.0], [-1.0, 0.0, 0.0]), Point2::new(4.0, 3.0));
    }

    #[test]
    fn test_facing_y() {
        assert_eq!(project_one([2.0, 3.0, 4.0], [0.0, 1.0, 0.0]), Point2::new(2.0, 4.0));
        assert_eq!(project_one([2.0, 3.0, 4.0], [0.0, -1.0, 0.0]), Point2::new(2.0, 4.0));
    }

    #[test]
    fn test_facing_z() {
        assert_eq!(project_one([2.0, 3.0, 4.0], [0.0, 0.0, 1.0]), Point2::new(2.0, 3.0));
    }

    #[test]
    fn test_zero_normal_projects_along_z() {
        assert_eq!(project_one([5.0, 6.0, 7.0], [0.0, 0.0, 0.0]), Point2::new(5.0, 6.0));
    }

    #[test]
    fn test_tie_goes_to_later_axis() {
        // X and Y both pass; Y is evaluated later and wins.
        assert_eq!(project_one([1.0, 2.0, 3.0], [1.0, 1.0, 0.0]), Point2::new(1.0, 3.0));
        // X and Z tie.
        assert_eq!(project_one([1.0, 2.0, 3.0], [0.5, 0.0, -0.5]), Point2::new(1.0, 2.0));
        // Y and Z tie.
        assert_eq!(project_one([1.0, 2.0, 3.0], [0.0, -0.7, 0.7]), Point2::new(1.0, 2.0));
        // All three tie.
        assert_eq!(project_one([1.0, 2.0, 3.0], [0.3, 0.3, -0.3]), Point2::new(1.0, 2.0));
    }

    #[test]
    fn test_nan_normal_maps_to_origin() {
        assert_eq!(ProjectionAxis::from_normal(&Vector3::new(f64::NAN, 0.0, 0.0)), None);
        assert_eq!(
            project_one([1.0, 2.0, 3.0], [f64::NAN, f64::NAN, f64::NAN]),
            Point2::origin()
        );
    }

    #[test]
    fn test_dominance_rules_over_grid() {
        let steps: [f64; 7] = [-1.0, -0.6, -0.25, 0.0, 0.25, 0.6, 1.0];
        let p = Point3::new(-3.5, 1.25, 9.0);
        for &x in &steps {
            for &y in &steps {
                for &z in &steps {
                    let n = Vector3::new(x, y, z);
                    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
                    let uv = project_vertex(&p, &n);
                    if az >= ax && az >= ay {
                        assert_eq!(uv, Point2::new(p.x, p.y), "normal {:?}", n);
                    } else if ay >= ax && ay >= az {
                        assert_eq!(uv, Point2::new(p.x, p.z), "normal {:?}", n);
                    } else {
                        assert!(ax > ay && ax > az);
                        assert_eq!(uv, Point2::new(p.z, p.y), "normal {:?}", n);
                    }
                }
            }
        }
    }

    #[test]
    fn test_box_faces() {
        let mut geometry = box_geometry(2.0, 4.0, 6.0).unwrap();
        reset_uvs(&mut geometry, &PlanarOptions::default()).unwrap();

        let positions = geometry.position();
        let uvs = geometry.uv().unwrap();
        for i in 0..geometry.vertex_count() {
            let p = positions.point3(i);
            let expected = match i / 4 {
                0 | 1 => Point2::new(p.z, p.y),
                2 | 3 => Point2::new(p.x, p.z),
                _ => Point2::new(p.x, p.y),
            };
            assert_eq!(uvs.point2(i), expected, "vertex {}", i);
        }
    }

    #[test]
    fn test_idempotent() {
        let mut geometry = cylinder_geometry(0.15, 0.15, 0.05, 16).unwrap();
        reset_uvs(&mut geometry, &PlanarOptions::default()).unwrap();
        let first = geometry.clone();
        reset_uvs(&mut geometry, &PlanarOptions::default()).unwrap();
        assert_eq!(geometry, first);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let source = box_geometry_segments(3.0, 2.0, 1.0, 40, 40, 40).unwrap();
        assert!(source.vertex_count() > BLOCK_SIZE);

        let mut parallel = source.clone();
        let mut sequential = source.clone();
        reset_uvs(&mut parallel, &PlanarOptions::default()).unwrap();
        reset_uvs(&mut sequential, &PlanarOptions::default().sequential()).unwrap();

        assert_eq!(parallel.uv(), sequential.uv());
        assert_eq!(parallel.uv().unwrap().count(), source.vertex_count());
        // Positions and normals are untouched.
        assert_eq!(parallel.position(), source.position());
        assert_eq!(parallel.normal(), source.normal());
    }

    #[test]
    fn test_planar_projection_matches_reset() {
        let mut geometry = box_geometry(13.0, 12.0, 0.3).unwrap();
        let uvs = planar_projection(&geometry, &PlanarOptions::default().sequential()).unwrap();
        let original_uv = geometry.uv().cloned();

        reset_uvs(&mut geometry, &PlanarOptions::default()).unwrap();
        assert_eq!(Some(&uvs.to_attribute()), geometry.uv());
        assert_ne!(original_uv.as_ref(), geometry.uv());
    }

    #[test]
    fn test_length_mismatch_leaves_uvs_untouched() {
        let mut geometry = box_geometry(1.0, 1.0, 1.0).unwrap();
        let before = geometry.uv().cloned();
        geometry.set_normal(Some(BufferAttribute::zeros(23, 3)));

        let err = reset_uvs(&mut geometry, &PlanarOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::AttributeLengthMismatch {
                attribute: "normal",
                expected: 24,
                actual: 23
            }
        ));
        assert_eq!(geometry.uv().cloned(), before);

        let mut geometry = box_geometry(1.0, 1.0, 1.0).unwrap();
        geometry.set_uv(Some(BufferAttribute::zeros(25, 2)));
        assert!(matches!(
            reset_uvs(&mut geometry, &PlanarOptions::default()),
            Err(GeometryError::AttributeLengthMismatch { attribute: "uv", .. })
        ));
    }

    #[test]
    fn test_missing_attributes() {
        let mut geometry = box_geometry(1.0, 1.0, 1.0).unwrap();
        geometry.set_uv(None);
        assert!(matches!(
            reset_uvs(&mut geometry, &PlanarOptions::default()),
            Err(GeometryError::MissingAttribute { attribute: "uv" })
        ));

        geometry.set_normal(None);
        assert!(matches!(
            planar_projection(&geometry, &PlanarOptions::default()),
            Err(GeometryError::MissingAttribute { attribute: "normal" })
        ));
    }

    #[test]
    fn test_wrong_item_size() {
        let position = BufferAttribute::zeros(2, 3);
        let normal = BufferAttribute::zeros(2, 3);
        let mut uv = BufferAttribute::zeros(2, 3);
        assert!(matches!(
            reset_buffer_uvs(&position, &normal, &mut uv, &PlanarOptions::default()),
            Err(GeometryError::InvalidItemSize { attribute: "uv", expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_reset_buffer_uvs() {
        let position = BufferAttribute::new(vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 3).unwrap();
        let normal = BufferAttribute::new(vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0], 3).unwrap();
        let mut uv = BufferAttribute::zeros(2, 2);
        reset_buffer_uvs(&position, &normal, &mut uv, &PlanarOptions::default()).unwrap();
        assert_eq!(uv.as_slice(), &[2.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_progress_reaches_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        let mut geometry = box_geometry_segments(1.0, 1.0, 1.0, 30, 30, 30).unwrap();
        let total = geometry.vertex_count();
        reset_uvs_with_progress(&mut geometry, &PlanarOptions::default(), &progress).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&(0, total)));
        assert_eq!(seen.last(), Some(&(total, total)));
        assert!(seen.iter().all(|&(current, t)| current <= total && t == total));
    }
}
