//! # Millkit CAM Tools
//!
//! Toolpath generation and G-code output for milling a part from an STL mesh.
//!
//! ## Operations
//!
//! - **Waterline Roughing**: horizontal cross-section contours from the top of the part down
//! - **Parallel Finishing**: raster passes following the top surface, alternating direction
//! - **G-code Emitter**: setup block, plunge/cut/retract per toolpath, shutdown block
//!
//! ## Supporting Infrastructure
//!
//! - **Slicer Service**: STL in, program file out; internal engine or external slicer
//! - **External Slicer**: process runner with output streaming and a time limit
//! - **Post Processor**: strips printer-only commands from external slicer output

pub mod error;
pub mod external_slicer;
pub mod gcode_emitter;
pub mod parallel_finishing;
pub mod post_processor;
pub mod slicer;
pub mod toolpath;
pub mod waterline;

pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
pub use external_slicer::{ExternalSlicer, ProcessOutput};
pub use gcode_emitter::GcodeEmitter;
pub use parallel_finishing::{ParallelFinishingGenerator, ParallelFinishingParameters};
pub use post_processor::{post_process, post_process_file, PostProcessOutput};
pub use slicer::{
    plan_toolpaths, write_program_file, SlicerService, SlicingResult, MIN_ROUGHING_LAYER,
    STEPOVER_RATIO,
};
pub use toolpath::{toolpaths_to_json, JobContext, Toolpath};
pub use waterline::{WaterlineGenerator, WaterlineParameters, LAYER_EPSILON};
