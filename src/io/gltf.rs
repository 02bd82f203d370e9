//! glTF format support.
//!
//! This module provides loading of geometries from glTF and GLB files. Every
//! triangle primitive becomes one [`Geometry`] carrying `position`, plus
//! `normal` and `uv` (`TEXCOORD_0`) when the primitive has them.
//!
//! Meshes are placed by walking the default scene (or the first scene) and
//! applying each node's transform, composed with its parents'. Files without
//! scenes fall back to every mesh in local space.
//!
//! Note: Saving to glTF is not yet supported.

use std::path::Path;

use nalgebra::Matrix4;

use crate::error::{GeometryError, Result};
use crate::geometry::{BufferAttribute, Geometry};

/// Load every triangle primitive from a glTF or GLB file.
///
/// # Example
///
/// ```no_run
/// use triplanar::io::gltf;
///
/// let geometries = gltf::load("toilet.glb").unwrap();
/// println!("{} primitives", geometries.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Geometry>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    read_from(&bytes, path.parent(), path)
}

/// Parse a glTF or GLB image held in memory.
///
/// `base_dir` resolves external buffer URIs; pass `None` when every buffer is
/// embedded.
pub fn from_slice(bytes: &[u8], base_dir: Option<&Path>) -> Result<Vec<Geometry>> {
    read_from(bytes, base_dir, Path::new("<memory>"))
}

pub(crate) fn read_from(
    bytes: &[u8],
    base_dir: Option<&Path>,
    source: &Path,
) -> Result<Vec<Geometry>> {
    let ::gltf::Gltf { document, blob } =
        ::gltf::Gltf::from_slice(bytes).map_err(|e| GeometryError::load(source, e))?;
    let buffers = ::gltf::import_buffers(&document, base_dir, blob)
        .map_err(|e| GeometryError::load(source, e))?;

    let mut geometries = Vec::new();

    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                read_node(&node, &Matrix4::identity(), &buffers, &mut geometries)?;
            }
        }
        // A file without scenes still carries usable meshes.
        None => {
            for mesh in document.meshes() {
                read_mesh(&mesh, None, &buffers, &mut geometries)?;
            }
        }
    }

    if geometries.is_empty() {
        return Err(GeometryError::load(
            source,
            "glTF file contains no triangle meshes",
        ));
    }

    Ok(geometries)
}

/// Read the meshes under `node`, placing them with the accumulated transform.
fn read_node(
    node: &::gltf::Node,
    parent: &Matrix4<f64>,
    buffers: &[::gltf::buffer::Data],
    geometries: &mut Vec<Geometry>,
) -> Result<()> {
    let local = Matrix4::<f32>::from(node.transform().matrix()).cast::<f64>();
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let placement = (world != Matrix4::identity()).then_some(&world);
        read_mesh(&mesh, placement, buffers, geometries)?;
    }
    for child in node.children() {
        read_node(&child, &world, buffers, geometries)?;
    }
    Ok(())
}

fn read_mesh(
    mesh: &::gltf::Mesh,
    placement: Option<&Matrix4<f64>>,
    buffers: &[::gltf::buffer::Data],
    geometries: &mut Vec<Geometry>,
) -> Result<()> {
    let mesh_name = mesh
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("mesh{}", mesh.index()));
    let primitive_count = mesh.primitives().len();

    for primitive in mesh.primitives() {
        let name = if primitive_count > 1 {
            format!("{}.{}", mesh_name, primitive.index())
        } else {
            mesh_name.clone()
        };

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        // Read positions
        let Some(positions) = reader.read_positions() else {
            log::warn!("skipping primitive {} without positions", name);
            continue;
        };
        let positions: Vec<f64> = positions
            .flat_map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect();
        let vertex_count = positions.len() / 3;

        // Read indices, converting strips and fans to triangle lists
        let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());
        let index = match primitive.mode() {
            ::gltf::mesh::Mode::Triangles => indices,
            ::gltf::mesh::Mode::TriangleStrip => Some(strip_to_triangles(
                &indices.unwrap_or_else(|| (0..vertex_count as u32).collect()),
            )),
            ::gltf::mesh::Mode::TriangleFan => Some(fan_to_triangles(
                &indices.unwrap_or_else(|| (0..vertex_count as u32).collect()),
            )),
            mode => {
                // Points and lines carry no surface to texture.
                log::warn!("skipping non-triangle primitive {} ({:?})", name, mode);
                continue;
            }
        };

        let mut geometry = Geometry::new(BufferAttribute::new(positions, 3)?)?.with_name(name);
        if let Some(normals) = reader.read_normals() {
            let normals: Vec<f64> = normals
                .flat_map(|n| [n[0] as f64, n[1] as f64, n[2] as f64])
                .collect();
            geometry = geometry.with_normal(BufferAttribute::new(normals, 3)?);
        }
        if let Some(tex_coords) = reader.read_tex_coords(0) {
            let uvs: Vec<f64> = tex_coords
                .into_f32()
                .flat_map(|t| [t[0] as f64, t[1] as f64])
                .collect();
            geometry = geometry.with_uv(BufferAttribute::new(uvs, 2)?);
        }
        if let Some(index) = index {
            geometry = geometry.with_index(index);
        }

        geometry.validate()?;
        if let Some(matrix) = placement {
            geometry.apply_matrix(matrix);
        }
        geometries.push(geometry);
    }
    Ok(())
}

fn strip_to_triangles(indices: &[u32]) -> Vec<u32> {
    let mut triangles = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
    for i in 0..indices.len().saturating_sub(2) {
        if i % 2 == 0 {
            triangles.extend_from_slice(&[indices[i], indices[i + 1], indices[i + 2]]);
        } else {
            // Reverse winding for odd triangles
            triangles.extend_from_slice(&[indices[i], indices[i + 2], indices[i + 1]]);
        }
    }
    triangles
}

fn fan_to_triangles(indices: &[u32]) -> Vec<u32> {
    let mut triangles = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
    for i in 1..indices.len().saturating_sub(1) {
        triangles.extend_from_slice(&[indices[0], indices[i], indices[i + 1]]);
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point2, Point3, Vector3};

    /// One indexed triangle with normals and texture coordinates, plus a
    /// line-mode mesh that should be skipped.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "buffers": [{
            "byteLength": 104,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 72, "byteLength": 24 },
            { "buffer": 0, "byteOffset": 96, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC2" },
            { "bufferView": 3, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "meshes": [
            { "name": "seat", "primitives": [{
                "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 },
                "indices": 3
            }] },
            { "name": "wire", "primitives": [{
                "attributes": { "POSITION": 0 },
                "mode": 1
            }] }
        ]
    }"#;

    #[test]
    fn test_from_slice() {
        let geometries = from_slice(TRIANGLE_GLTF.as_bytes(), None).unwrap();
        assert_eq!(geometries.len(), 1);

        let seat = &geometries[0];
        assert_eq!(seat.name(), Some("seat"));
        assert_eq!(seat.vertex_count(), 3);
        assert_eq!(seat.index(), Some(&[0, 1, 2][..]));
        assert_eq!(seat.position().point3(1), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(seat.normal().unwrap().vector3(2), Vector3::z());
        assert_eq!(seat.uv().unwrap().point2(2), Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_no_triangles() {
        let lines_only =
            TRIANGLE_GLTF.replace(r#""TEXCOORD_0": 2 },"#, r#""TEXCOORD_0": 2 }, "mode": 1,"#);
        assert_ne!(lines_only, TRIANGLE_GLTF);
        assert!(matches!(
            from_slice(lines_only.as_bytes(), None),
            Err(GeometryError::LoadError { .. })
        ));
    }

    #[test]
    fn test_node_transforms_are_applied() {
        // A translated parent with a scaled child that holds the seat mesh.
        let placed = TRIANGLE_GLTF.replacen(
            r#""meshes": ["#,
            r#""scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "children": [1], "translation": [10.0, 0.0, 0.0] },
            { "mesh": 0, "scale": [2.0, 2.0, 2.0] }
        ],
        "meshes": ["#,
            1,
        );
        assert_ne!(placed, TRIANGLE_GLTF);

        let geometries = from_slice(placed.as_bytes(), None).unwrap();
        assert_eq!(geometries.len(), 1);

        let seat = &geometries[0];
        let p1 = seat.position().point3(1);
        let p2 = seat.position().point3(2);
        assert!((p1 - Point3::new(12.0, 0.0, 0.0)).norm() < 1e-9, "{:?}", p1);
        assert!((p2 - Point3::new(10.0, 2.0, 0.0)).norm() < 1e-9, "{:?}", p2);
        // Uniform scale keeps unit normals.
        assert!((seat.normal().unwrap().vector3(0) - Vector3::z()).norm() < 1e-9);
        // Texture coordinates are untouched by placement.
        assert_eq!(seat.uv().unwrap().point2(2), Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            from_slice(b"not gltf", None),
            Err(GeometryError::LoadError { .. })
        ));
    }

    #[test]
    fn test_strip_and_fan() {
        assert_eq!(strip_to_triangles(&[0, 1, 2, 3]), vec![0, 1, 2, 1, 3, 2]);
        assert_eq!(fan_to_triangles(&[0, 1, 2, 3]), vec![0, 1, 2, 0, 2, 3]);
        assert!(strip_to_triangles(&[0, 1]).is_empty());
        assert!(fan_to_triangles(&[0]).is_empty());
    }
}
