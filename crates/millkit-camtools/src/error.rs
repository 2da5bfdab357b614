//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for slicing, toolpath
//! generation, external slicer runs and parameter validation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use millkit_core::CoreError;
use millkit_settings::SettingsError;

/// Errors that can occur during CAM operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// The STL input does not exist.
    #[error("STL file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The job was cancelled between layers or scanlines.
    #[error("slicing cancelled")]
    Cancelled,

    /// The external slicer exited unsuccessfully or produced no output.
    #[error("External slicer failed (exit code {}): {message}", describe_exit(.exit_code))]
    ExternalSlicerFailed {
        /// Process exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Short description of the failure.
        message: String,
    },

    /// The external slicer exceeded its time limit and was killed.
    #[error("External slicer timed out after {timeout_secs}s")]
    ExternalSlicerTimeout {
        /// The configured limit in seconds.
        timeout_secs: u64,
    },

    /// A blocking worker task panicked or was aborted.
    #[error("Slicing task failed: {0}")]
    TaskFailed(String),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Mesh loading failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Machining settings were rejected.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Errors related to generator parameter validation.
#[derive(Error, Debug)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ParameterError {
    /// Reject anything that is not a finite, strictly positive number.
    pub fn require_positive(name: &str, value: f64) -> ParameterResult<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                name: name.to_string(),
                value,
                min: 0.0,
                max: f64::INFINITY,
            })
        }
    }
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
