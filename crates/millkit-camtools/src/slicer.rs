//! # Slicer Service
//!
//! Turns an STL file into a milling program. By default the internal engine
//! runs waterline roughing followed by parallel finishing; when an external
//! slicer executable is configured the job is delegated to it instead and its
//! output post-processed for milling.
//!
//! Public entry points never fail: every error becomes a [`SlicingResult`]
//! with `success == false` and a message.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use millkit_core::{load_stl, CancelToken, Mesh, ProgressCallback};
use millkit_settings::{ExternalSlicerSettings, MachiningSettings};
use serde::Serialize;
use tracing::{error, info};

use crate::error::{CamToolError, CamToolResult};
use crate::external_slicer::ExternalSlicer;
use crate::gcode_emitter::GcodeEmitter;
use crate::parallel_finishing::{ParallelFinishingGenerator, ParallelFinishingParameters};
use crate::post_processor::post_process_file;
use crate::toolpath::{JobContext, Toolpath};
use crate::waterline::{WaterlineGenerator, WaterlineParameters};

/// Roughing layers are never thinner than this (mm).
pub const MIN_ROUGHING_LAYER: f64 = 0.5;

/// Finishing stepover as a fraction of the tool diameter.
pub const STEPOVER_RATIO: f64 = 0.4;

/// Outcome of one slicing operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlicingResult {
    /// Whether a program was written
    pub success: bool,
    /// Path of the written program
    pub output_file_path: Option<PathBuf>,
    /// Size of the written program in bytes
    pub file_size: u64,
    /// Wall time spent
    pub processing_time: Duration,
    /// External slicer exit code; `Some(0)` for the internal engine
    pub exit_code: Option<i32>,
    /// Captured external slicer stdout
    pub output: String,
    /// Captured external slicer stderr
    pub error_output: String,
    /// Human-readable failure description
    pub error_message: Option<String>,
}

/// STL to G-code orchestrator
#[derive(Debug, Clone, Default)]
pub struct SlicerService {
    external: Option<ExternalSlicer>,
}

impl SlicerService {
    /// Service using the internal CAM engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Service delegating to an external slicer
    pub fn with_external_slicer(slicer: ExternalSlicer) -> Self {
        Self {
            external: Some(slicer),
        }
    }

    /// Use the configured external slicer when its executable exists,
    /// the internal engine otherwise
    pub fn from_settings(settings: &ExternalSlicerSettings) -> Self {
        match settings.usable_executable() {
            Some(exe) => Self::with_external_slicer(ExternalSlicer::new(
                exe,
                Duration::from_secs(settings.timeout_secs),
            )),
            None => Self::new(),
        }
    }

    pub fn uses_external_slicer(&self) -> bool {
        self.external.is_some()
    }

    /// Slice with default machining settings
    pub async fn slice_with_defaults(
        &self,
        stl: &Path,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> SlicingResult {
        self.slice_with_settings(stl, output, &MachiningSettings::default(), progress)
            .await
    }

    /// Slice with caller-supplied machining settings
    pub async fn slice_with_settings(
        &self,
        stl: &Path,
        output: &Path,
        settings: &MachiningSettings,
        progress: Option<ProgressCallback>,
    ) -> SlicingResult {
        self.slice(stl, output, settings, JobContext::new(progress, CancelToken::new()))
            .await
    }

    /// Slice with an explicit job context, allowing cancellation
    pub async fn slice(
        &self,
        stl: &Path,
        output: &Path,
        settings: &MachiningSettings,
        ctx: JobContext,
    ) -> SlicingResult {
        let start = Instant::now();
        let mut result = SlicingResult::default();

        match self.try_slice(stl, output, settings, &ctx, &mut result).await {
            Ok(()) => {
                result.success = true;
                result.output_file_path = Some(output.to_path_buf());
                result.file_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
            }
            Err(err) => {
                error!("Slicing {} failed: {}", stl.display(), err);
                ctx.report(&format!("[ERROR] {}", err));
                result.success = false;
                result.error_message = Some(err.to_string());
            }
        }

        result.processing_time = start.elapsed();
        result
    }

    async fn try_slice(
        &self,
        stl: &Path,
        output: &Path,
        settings: &MachiningSettings,
        ctx: &JobContext,
        result: &mut SlicingResult,
    ) -> CamToolResult<()> {
        if !stl.is_file() {
            return Err(CamToolError::InputNotFound(stl.to_path_buf()));
        }
        settings.validate()?;

        if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        match &self.external {
            Some(slicer) => {
                Self::run_external(slicer, stl, output, settings, ctx, result).await
            }
            None => {
                ctx.report("Using internal CAM engine (waterline roughing + parallel finishing)");
                let (stl, output) = (stl.to_path_buf(), output.to_path_buf());
                let (settings, job) = (settings.clone(), ctx.clone());
                tokio::task::spawn_blocking(move || {
                    write_program_file(&stl, &output, &settings, &job)
                })
                .await
                .map_err(|e| CamToolError::TaskFailed(e.to_string()))??;
                result.exit_code = Some(0);
                Ok(())
            }
        }
    }

    async fn run_external(
        slicer: &ExternalSlicer,
        stl: &Path,
        output: &Path,
        settings: &MachiningSettings,
        ctx: &JobContext,
        result: &mut SlicingResult,
    ) -> CamToolResult<()> {
        ctx.check_cancelled()?;
        ctx.report(&format!(
            "Using external slicer: {}",
            slicer.executable().display()
        ));

        let mut profile = tempfile::Builder::new()
            .prefix("millkit-")
            .suffix(".ini")
            .tempfile()?;
        profile.write_all(settings.to_ini().as_bytes())?;
        profile.flush()?;
        ctx.report(&format!(
            "Temporary slicer profile: {}",
            profile.path().display()
        ));

        let process = slicer.run(stl, output, Some(profile.path()), ctx).await?;
        result.exit_code = process.exit_code;
        result.output = process.stdout.clone();
        result.error_output = process.stderr.clone();

        if !process.succeeded() || !output.is_file() {
            return Err(CamToolError::ExternalSlicerFailed {
                exit_code: process.exit_code,
                message: "slicer failed or produced no G-code file".to_string(),
            });
        }

        post_process_file(output, ctx)?;
        ctx.report(&format!("G-code written by external slicer: {}", output.display()));
        Ok(())
    }
}

/// Roughing then finishing toolpaths for an already-loaded mesh
pub fn plan_toolpaths(
    mesh: &Mesh,
    settings: &MachiningSettings,
    ctx: &JobContext,
) -> CamToolResult<Vec<Toolpath>> {
    let roughing = WaterlineGenerator::new(WaterlineParameters {
        layer_height: settings.cutting_depth.max(MIN_ROUGHING_LAYER),
        step_resolution: settings.step_resolution,
        work_area_z: settings.work_area_z,
        feed_rate: settings.cutting_feed_rate,
    })
    .generate(mesh, ctx)?;

    let finishing = ParallelFinishingGenerator::new(ParallelFinishingParameters {
        stepover: (STEPOVER_RATIO * settings.tool_diameter).max(settings.step_resolution),
        step_resolution: settings.step_resolution,
        axis: settings.finishing_axis,
        feed_rate: settings.cutting_feed_rate,
    })
    .generate(mesh, ctx)?;

    info!(
        "Planned {} roughing and {} finishing toolpaths",
        roughing.len(),
        finishing.len()
    );

    let mut toolpaths = roughing;
    toolpaths.extend(finishing);
    Ok(toolpaths)
}

/// Load, plan, emit and write a program. Blocking.
pub fn write_program_file(
    stl: &Path,
    output: &Path,
    settings: &MachiningSettings,
    ctx: &JobContext,
) -> CamToolResult<()> {
    let mesh = load_stl(stl)?;
    ctx.report(&format!(
        "Loaded {} triangles from {}",
        mesh.len(),
        stl.display()
    ));

    let toolpaths = plan_toolpaths(&mesh, settings, ctx)?;
    let gcode = GcodeEmitter::new(settings.clone()).generate(&toolpaths);

    std::fs::write(output, gcode)?;
    ctx.report(&format!("G-code written: {}", output.display()));
    Ok(())
}
