use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Callback Types
// ============================================================================

/// Human-readable progress sink.
///
/// Messages are for display only and carry no stable format.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Wrap a closure as a [`ProgressCallback`].
pub fn progress_fn<F>(f: F) -> ProgressCallback
where
    F: Fn(&str) + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation flag shared between a caller and a long-running job.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Jobs notice at their next iteration boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
