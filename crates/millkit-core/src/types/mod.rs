//! Shared type aliases and small utility types.

mod aliases;

pub use aliases::{progress_fn, CancelToken, ProgressCallback};
