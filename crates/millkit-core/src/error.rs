//! Error types for the core crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by core operations that touch the filesystem.
///
/// Geometry queries never fail; they return `Option` and skip degenerate input.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The mesh file does not exist.
    #[error("Mesh file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error while reading a mesh file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
