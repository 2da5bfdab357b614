//! # Millkit
//!
//! STL to G-code toolpath generation for 3-axis milling, and G-code motion
//! simulation.
//!
//! ## Architecture
//!
//! Millkit is organized as a workspace with multiple crates:
//!
//! 1. **millkit-core** - Geometry kernel, STL loading, progress/cancellation types
//! 2. **millkit-settings** - Machining, external slicer and playback configuration
//! 3. **millkit-camtools** - Waterline roughing, parallel finishing, G-code emission, slicer service
//! 4. **millkit-visualizer** - G-code parser, motion interpreter, playback
//! 5. **millkit** - Command-line front end that integrates all crates
//!
//! ## Data flow
//!
//! - STL bytes → mesh → roughing + finishing toolpaths → G-code text
//! - G-code text → parsed commands → timed moves → playback positions

pub use millkit_core::{
    load_stl, parse_stl, progress_fn, Aabb, CancelToken, CoreError, Mesh, Point3,
    ProgressCallback, ScanAxis, Triangle,
};

pub use millkit_settings::{
    default_config_path, ExternalSlicerSettings, MachiningSettings, MillkitConfig,
    PlaybackSettings, SettingsError,
};

pub use millkit_camtools::{
    plan_toolpaths, post_process, CamToolError, ExternalSlicer, GcodeEmitter, JobContext,
    ParallelFinishingGenerator, ParallelFinishingParameters, SlicerService, SlicingResult,
    Toolpath, WaterlineGenerator, WaterlineParameters,
};

pub use millkit_visualizer::{
    estimate_duration, parse_line, parse_program, MotionInterpreter, MotionResult,
    ParsedCommand, PlaybackCommand, PlaybackDriver, PlaybackEvent, PlaybackSession,
    PositioningMode,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
