//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the validation engine, covering the full
//! taxonomy from total input errors (bad workspace, unknown check name) down
//! to per-layer loading and geometry problems.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from the loader, spatial index, checks, and engine
//! - **Output**: Structured error types with context, grouped by category
//! - **Propagation policy**: input errors abort the run before any check
//!   executes; layer/schema/geometry errors stay local to the check that hit
//!   them and are converted into that check's `Error` status
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Category accessor for structured logging and report error tags
//! - Clear split between input errors and check-local errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Error types for the validation engine
#[derive(Debug, Error)]
pub enum ValidationError {
    // Input errors: surfaced to the caller before any check runs
    #[error("Workspace directory not found: {path:?}")]
    WorkspaceNotFound { path: PathBuf },

    #[error("Unknown check name: '{name}'")]
    UnknownCheck { name: String },

    // Check-local errors: caught at the check boundary
    #[error("Layer '{layer}' not found in workspace ({path:?})")]
    LayerNotFound { layer: String, path: PathBuf },

    #[error("Schema error in layer '{layer}': {details}")]
    Schema { layer: String, details: String },

    #[error("Geometry error in layer '{layer}': {details}")]
    Geometry { layer: String, details: String },

    #[error("Coordinate system mismatch: layer '{layer}' declares '{found}', expected '{expected}'")]
    CrsMismatch {
        layer: String,
        expected: String,
        found: String,
    },

    // Infrastructure errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ValidationError {
    /// True for errors that invalidate the whole request, not just one check.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ValidationError::WorkspaceNotFound { .. } | ValidationError::UnknownCheck { .. }
        )
    }

    /// Get error category for logging and for the report's `errors[]` type tags
    pub fn category(&self) -> &'static str {
        match self {
            ValidationError::WorkspaceNotFound { .. } | ValidationError::UnknownCheck { .. } => {
                "input"
            }
            ValidationError::LayerNotFound { .. } => "layer_not_found",
            ValidationError::Schema { .. } | ValidationError::CrsMismatch { .. } => "schema_error",
            ValidationError::Geometry { .. } => "geometry_error",
            ValidationError::Config { .. } => "configuration",
            ValidationError::Io { .. } | ValidationError::Json { .. } => "io",
            ValidationError::Internal { .. } => "internal",
        }
    }
}

// Helper macro for internal errors with formatted messages
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::errors::ValidationError::Internal {
            message: $msg.to_string(),
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::ValidationError::Internal {
            message: format!($fmt, $($arg)*),
        }
    };
}
