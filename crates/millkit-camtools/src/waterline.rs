//! # Waterline Roughing
//!
//! Slices the mesh with horizontal planes from the top of the part down and
//! turns every cross-section contour into a cutting toolpath.

use millkit_core::{chain_segments, simplify_collinear, Mesh, CHAIN_TOLERANCE};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CamToolResult, ParameterError};
use crate::toolpath::{JobContext, Toolpath};

/// Offset from the top and bottom bounds so flat skins are not sliced on their own plane.
pub const LAYER_EPSILON: f64 = 1e-3;

/// Parameters for waterline roughing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterlineParameters {
    /// Vertical distance between layers (mm)
    pub layer_height: f64,
    /// Lower limit for the layer height (mm)
    pub step_resolution: f64,
    /// Highest Z the machine can reach; layers start at or below it (mm)
    pub work_area_z: f64,
    /// Feed rate assigned to every contour (mm/min)
    pub feed_rate: f64,
}

/// Generator for waterline roughing toolpaths
pub struct WaterlineGenerator {
    params: WaterlineParameters,
}

impl WaterlineGenerator {
    /// Create a new WaterlineGenerator with the given parameters
    pub fn new(params: WaterlineParameters) -> Self {
        Self { params }
    }

    /// Effective layer height after clamping to the step resolution
    pub fn layer_height(&self) -> f64 {
        self.params.layer_height.max(self.params.step_resolution)
    }

    /// Heights of every layer, top to bottom, for a part spanning `min_z..max_z`
    ///
    /// The top bound is clamped to the work area and the bottom to zero. The
    /// first layer sits just below the top so a flat top face is cut through.
    pub fn layer_heights(&self, min_z: f64, max_z: f64) -> Vec<f64> {
        let layer = self.layer_height();
        let top = max_z.min(self.params.work_area_z);
        let bottom = min_z.max(0.0);

        let mut heights = Vec::new();
        let mut k = 0usize;
        loop {
            let z = top - k as f64 * layer;
            if z <= bottom + LAYER_EPSILON {
                break;
            }
            heights.push(z.min(top - LAYER_EPSILON));
            k += 1;
        }
        heights
    }

    /// Generate contours for every layer, ordered top to bottom
    pub fn generate(&self, mesh: &Mesh, ctx: &JobContext) -> CamToolResult<Vec<Toolpath>> {
        ParameterError::require_positive("layer_height", self.layer_height())?;
        ParameterError::require_positive("feed_rate", self.params.feed_rate)?;

        let Some(bounds) = mesh.bounds() else {
            ctx.report("Waterline: empty mesh, nothing to cut");
            return Ok(Vec::new());
        };

        let heights = self.layer_heights(bounds.min.z, bounds.max.z);
        info!(
            "Waterline roughing: {} layers of {:.3} mm",
            heights.len(),
            self.layer_height()
        );

        let mut toolpaths = Vec::new();
        for z in heights {
            ctx.check_cancelled()?;

            let segments = mesh.slice_at_z(z);
            let mut contours = 0usize;
            for chain in chain_segments(&segments, CHAIN_TOLERANCE) {
                let points = simplify_collinear(&chain, CHAIN_TOLERANCE);
                if points.len() < 2 {
                    continue;
                }
                toolpaths.push(Toolpath::cutting(
                    points,
                    self.params.feed_rate,
                    format!("Waterline Z={:.3}", z),
                ));
                contours += 1;
            }

            ctx.report(&format!("Waterline: Z={:.3} -> {} contours", z, contours));
        }

        ctx.report(&format!("Waterline complete: {} toolpaths", toolpaths.len()));
        Ok(toolpaths)
    }
}
