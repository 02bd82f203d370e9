//! Geometry file I/O.
//!
//! This module provides functions for loading and saving geometries in various
//! formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Positions, normals, texture coordinates |
//! | glTF | `.gltf`, `.glb` | ✓ | ✗ | One geometry per triangle primitive |
//!
//! A file may contain several geometries (OBJ objects or glTF primitives), so
//! loaders return a `Vec<Geometry>`.
//!
//! # Usage
//!
//! ```no_run
//! use triplanar::io::{load, save};
//!
//! // Load with automatic format detection
//! let geometries = load("toilet.glb").unwrap();
//!
//! // Save with automatic format detection
//! save(&geometries, "toilet.obj").unwrap();
//! ```
//!
//! For large files, [`task::LoadTask`] reads the file with progress reporting,
//! optionally on a thread pool of the caller's choice.

pub mod gltf;
pub mod obj;
pub mod task;

use std::path::Path;

use crate::error::{GeometryError, Result};
use crate::geometry::Geometry;

/// Supported geometry file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// glTF format.
    Gltf,
    /// glTF binary format.
    Glb,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "gltf" => Some(Format::Gltf),
            "glb" => Some(Format::Glb),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Detect format from file path, failing with [`GeometryError::UnsupportedFormat`].
    pub fn require<P: AsRef<Path>>(path: P) -> Result<Format> {
        let path = path.as_ref();
        Format::from_path(path).ok_or_else(|| GeometryError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }
}

/// Load every geometry in a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Geometry>> {
    let path = path.as_ref();
    let geometries = match Format::require(path)? {
        Format::Obj => obj::load(path)?,
        Format::Gltf | Format::Glb => gltf::load(path)?,
    };
    log_loaded(path, &geometries);
    Ok(geometries)
}

/// Parse an in-memory file image whose format is already known.
///
/// `path` is used to resolve external glTF buffers and in error messages.
pub fn from_bytes(format: Format, bytes: &[u8], path: &Path) -> Result<Vec<Geometry>> {
    let geometries = match format {
        Format::Obj => obj::read_from(bytes, path)?,
        Format::Gltf | Format::Glb => gltf::read_from(bytes, path.parent(), path)?,
    };
    log_loaded(path, &geometries);
    Ok(geometries)
}

/// Save geometries to a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn save<P: AsRef<Path>>(geometries: &[Geometry], path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::require(path)? {
        Format::Obj => obj::save(geometries, path),
        Format::Gltf | Format::Glb => Err(GeometryError::SaveError {
            path: path.to_path_buf(),
            message: "glTF saving is not yet supported".to_string(),
        }),
    }
}

fn log_loaded(path: &Path, geometries: &[Geometry]) {
    let vertices: usize = geometries.iter().map(Geometry::vertex_count).sum();
    log::info!(
        "loaded {} geometries ({} vertices) from {}",
        geometries.len(),
        vertices,
        path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/toilet.GLB"), Some(Format::Glb));
        assert_eq!(Format::from_path("scene.gltf"), Some(Format::Gltf));
        assert_eq!(Format::from_path("wall.obj"), Some(Format::Obj));
        assert_eq!(Format::from_path("mesh.stl"), None);
        assert_eq!(Format::from_path("README"), None);
    }

    #[test]
    fn test_unsupported_format() {
        match load("mesh.ply") {
            Err(GeometryError::UnsupportedFormat { extension }) => assert_eq!(extension, "ply"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            save(&[], "noext"),
            Err(GeometryError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_gltf_save_unsupported() {
        assert!(matches!(
            save(&[], "out.glb"),
            Err(GeometryError::SaveError { .. })
        ));
    }
}
