//! Toolpaths and the job context shared by the generators.

use millkit_core::{CancelToken, Point3, ProgressCallback};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CamToolError, CamToolResult};

/// One continuous tool motion: a contour pass or a raster line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toolpath {
    /// Ordered positions in generator coordinates (Y not yet inverted)
    pub points: Vec<Point3<f64>>,
    /// Feed rate for the cutting moves (mm/min)
    pub feed_rate: f64,
    /// Rapid (non-cutting) motion
    pub is_rapid: bool,
    /// Label written as a comment before the path
    pub comment: String,
}

impl Toolpath {
    /// A cutting toolpath.
    pub fn cutting(points: Vec<Point3<f64>>, feed_rate: f64, comment: impl Into<String>) -> Self {
        Self {
            points,
            feed_rate,
            is_rapid: false,
            comment: comment.into(),
        }
    }

    /// Toolpaths with fewer than two points carry no motion.
    pub fn is_usable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn first_point(&self) -> Option<&Point3<f64>> {
        self.points.first()
    }

    /// Sum of segment lengths.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// Serialize toolpaths to pretty JSON for inspection.
pub fn toolpaths_to_json(toolpaths: &[Toolpath]) -> CamToolResult<String> {
    Ok(serde_json::to_string_pretty(toolpaths)?)
}

/// Progress sink and cancellation flag for one generation job.
#[derive(Clone, Default)]
pub struct JobContext {
    progress: Option<ProgressCallback>,
    cancel: CancelToken,
}

impl JobContext {
    pub fn new(progress: Option<ProgressCallback>, cancel: CancelToken) -> Self {
        Self { progress, cancel }
    }

    pub fn with_progress(progress: ProgressCallback) -> Self {
        Self {
            progress: Some(progress),
            cancel: CancelToken::default(),
        }
    }

    /// Forward a human-readable progress message.
    pub fn report(&self, message: &str) {
        debug!("{}", message);
        if let Some(progress) = &self.progress {
            progress(message);
        }
    }

    /// Fails with [`CamToolError::Cancelled`] once cancellation was requested.
    pub fn check_cancelled(&self) -> CamToolResult<()> {
        if self.cancel.is_cancelled() {
            Err(CamToolError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

impl std::fmt::Debug for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}
