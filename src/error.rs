//! Error types for triplanar.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`GeometryError`].
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors that can occur during geometry operations.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// A required vertex attribute is absent.
    #[error("geometry has no `{attribute}` attribute")]
    MissingAttribute {
        /// Name of the missing attribute.
        attribute: &'static str,
    },

    /// An attribute's vertex count differs from the position count.
    #[error("attribute `{attribute}` has {actual} entries, expected {expected}")]
    AttributeLengthMismatch {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// Number of vertices in the position attribute.
        expected: usize,
        /// Number of entries in the offending attribute.
        actual: usize,
    },

    /// An attribute has the wrong number of components per vertex.
    #[error("attribute `{attribute}` has item size {actual}, expected {expected}")]
    InvalidItemSize {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// Required item size.
        expected: usize,
        /// Actual item size.
        actual: usize,
    },

    /// A flat attribute array whose length is not a whole number of items.
    #[error("attribute array of length {len} is not divisible by item size {item_size}")]
    MalformedAttribute {
        /// Length of the flat array.
        len: usize,
        /// Requested item size.
        item_size: usize,
    },

    /// A triangle index points past the end of the vertex buffers.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    InvalidIndex {
        /// The offending index value.
        index: usize,
        /// Number of vertices in the geometry.
        vertex_count: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading geometry from file.
    #[error("failed to load geometry from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving geometry to file.
    #[error("failed to save geometry to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl GeometryError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        GeometryError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for `path`.
    pub(crate) fn load<P: Into<PathBuf>, M: ToString>(path: P, message: M) -> Self {
        GeometryError::LoadError {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
