//! Error types for chisel.
//!
//! Every fallible operation in the crate returns [`MeshError`] through the
//! [`Result`] alias. Load failures are fatal to constructing an analyzer or
//! editor; edit failures are reported as values and leave the mesh untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while loading, analyzing or editing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source could not be parsed into a single mesh.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path (`<memory>` for byte streams).
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
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

    /// An edit could not be applied. The mesh keeps its prior state.
    #[error("{operation} failed: {reason}")]
    OperationFailed {
        /// Name of the operation.
        operation: &'static str,
        /// Why it failed.
        reason: String,
    },

    /// The operation is part of the public surface but has no defined algorithm.
    #[error("{operation} is not yet specified")]
    Unspecified {
        /// Name of the operation.
        operation: &'static str,
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

    /// Malformed JSON parameter set or report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an operation failure.
    pub fn failed(operation: &'static str, reason: impl Into<String>) -> Self {
        MeshError::OperationFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether this error came from loading source data.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            MeshError::LoadError { .. } | MeshError::UnsupportedFormat { .. } | MeshError::EmptyMesh
        )
    }
}
