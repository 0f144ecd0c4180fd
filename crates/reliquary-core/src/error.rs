//! Unified error handling for reliquary
//!
//! This module provides a single error type covering every failure mode of
//! the conversion pipeline, from fragment resolution through GLB re-parsing.

use thiserror::Error;

/// Unified error type for all reliquary operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Fragment Errors ====================

    /// Fragment index missing from the table
    #[error("Fragment not found at index {index}")]
    NotFound { index: u32 },

    /// Fragment at an index has a different type tag than expected
    #[error("Type mismatch at index {index}: expected {expected}, found {found}")]
    TypeMismatch {
        index: u32,
        expected: &'static str,
        found: &'static str,
    },

    /// Internally inconsistent fragment data (array length mismatches,
    /// out-of-range indices)
    #[error("Corrupted fragment data: {message}")]
    DataCorruption { message: String },

    /// A bone entry was reached twice during skeleton traversal
    #[error("Cycle detected in skeleton at bone entry {entry}")]
    CycleDetected { entry: u32 },

    // ==================== Container Errors ====================

    /// Exported container does not conform to the expected byte layout
    #[error("Container format error: {message}")]
    FormatError { message: String },

    /// Scene contained no exportable node
    #[error("Scene contains no exportable node")]
    ExportEmpty,

    // ==================== Pipeline Errors ====================

    /// Conversion request carried an unrecognized unit type tag
    #[error("Unknown unit type: {kind}")]
    UnknownUnitType { kind: String },

    /// Requested export configuration is not supported
    #[error("Unsupported export configuration: {message}")]
    Unsupported { message: String },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a data corruption error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Error::DataCorruption {
            message: message.into(),
        }
    }

    /// Create a container format error
    pub fn format(message: impl Into<String>) -> Self {
        Error::FormatError {
            message: message.into(),
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error aborts the whole run rather than one unit
    ///
    /// Everything except `UnknownUnitType` is contained at the unit boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UnknownUnitType { .. })
    }

    /// Check if this is a per-mesh error that only skips the offending mesh
    pub fn is_mesh_local(&self) -> bool {
        matches!(self, Error::DataCorruption { .. })
    }
}
