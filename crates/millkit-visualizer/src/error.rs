//! Error types for the visualizer crate.

use thiserror::Error;

/// Errors that can occur while driving a playback session.
#[derive(Error, Debug)]
pub enum VisualizerError {
    /// The session task has exited and no longer accepts commands.
    #[error("Playback session closed")]
    SessionClosed,

    /// The session task panicked or was aborted.
    #[error("Playback task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for visualizer operations.
pub type VisualizerResult<T> = Result<T, VisualizerError>;
