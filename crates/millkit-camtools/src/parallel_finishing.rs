//! # Parallel Finishing
//!
//! Raster finishing pass: evenly spaced scanlines across the part, each one
//! following the top surface height, alternating direction row to row.

use millkit_core::{Mesh, Point3, ScanAxis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CamToolResult, ParameterError};
use crate::toolpath::{JobContext, Toolpath};

/// Upper bound on the sample spacing along a scanline (mm).
const MAX_SAMPLE_STEP: f64 = 0.5;

/// Parameters for parallel finishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelFinishingParameters {
    /// Distance between adjacent scanlines (mm)
    pub stepover: f64,
    /// Lower limit for the stepover and sample spacing (mm)
    pub step_resolution: f64,
    /// Scanline direction
    pub axis: ScanAxis,
    /// Feed rate assigned to every pass (mm/min)
    pub feed_rate: f64,
}

/// Generator for parallel finishing toolpaths
pub struct ParallelFinishingGenerator {
    params: ParallelFinishingParameters,
}

impl ParallelFinishingGenerator {
    /// Create a new ParallelFinishingGenerator with the given parameters
    pub fn new(params: ParallelFinishingParameters) -> Self {
        Self { params }
    }

    /// Effective stepover after clamping to the step resolution
    pub fn stepover(&self) -> f64 {
        self.params.stepover.max(self.params.step_resolution)
    }

    /// Spacing of height samples along a scanline
    pub fn sample_step(&self) -> f64 {
        self.params
            .step_resolution
            .max((self.stepover() / 6.0).min(MAX_SAMPLE_STEP))
    }

    /// Generate one pass per scanline, in scan order
    pub fn generate(&self, mesh: &Mesh, ctx: &JobContext) -> CamToolResult<Vec<Toolpath>> {
        let stepover = ParameterError::require_positive("stepover", self.stepover())?;
        let sample_step = ParameterError::require_positive("sample_step", self.sample_step())?;
        ParameterError::require_positive("feed_rate", self.params.feed_rate)?;

        let Some(bounds) = mesh.bounds() else {
            ctx.report("Parallel finishing: empty mesh, nothing to cut");
            return Ok(Vec::new());
        };

        let axis = self.params.axis;
        let fixed = axis.fixed_index();
        let (fixed_min, fixed_max) = (bounds.min[fixed], bounds.max[fixed]);
        let rows = ((fixed_max - fixed_min) / stepover + 1e-9).floor() as usize;
        let label = match axis {
            ScanAxis::X => "Y",
            ScanAxis::Y => "X",
        };

        info!(
            "Parallel finishing along {}: {} scanlines, stepover {:.3} mm, sample {:.3} mm",
            axis,
            rows + 1,
            stepover,
            sample_step
        );

        let mut toolpaths = Vec::new();
        for row in 0..=rows {
            ctx.check_cancelled()?;

            let value = fixed_min + row as f64 * stepover;
            let mut points = self.sample_scanline(mesh, value, sample_step);
            if points.len() < 2 {
                continue;
            }
            if row % 2 == 1 {
                points.reverse();
            }

            toolpaths.push(Toolpath::cutting(
                points,
                self.params.feed_rate,
                format!("Parallel pass {}={:.3}", label, value),
            ));
        }

        ctx.report(&format!(
            "Parallel finishing complete: {} toolpaths",
            toolpaths.len()
        ));
        Ok(toolpaths)
    }

    /// Surface points along the scanline at `value`, in increasing order.
    fn sample_scanline(&self, mesh: &Mesh, value: f64, sample_step: f64) -> Vec<Point3<f64>> {
        let axis = self.params.axis;
        let point_at = |along: f64| match axis {
            ScanAxis::X => (along, value),
            ScanAxis::Y => (value, along),
        };

        let mut points = Vec::new();
        for interval in mesh.scanline_intervals(axis, value) {
            let count = (interval.length() / sample_step + 1e-9).floor() as usize;
            let mut positions: Vec<f64> = (0..=count)
                .map(|i| interval.start + i as f64 * sample_step)
                .collect();
            if interval.end - interval.start - count as f64 * sample_step > 1e-9 {
                positions.push(interval.end);
            }

            for along in positions {
                let (x, y) = point_at(along);
                if let Some(z) = mesh.sample_top_z(x, y).filter(|z| z.is_finite()) {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points
    }
}
