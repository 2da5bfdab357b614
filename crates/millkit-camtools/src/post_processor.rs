//! G-code post-processor for external slicer output
//!
//! Slicers built for 3D printers emit heater, fan and extruder commands that a
//! mill must not see. This pass drops those lines, strips extrusion words from
//! motion lines and prefixes a metric/absolute/XY-plane setup block.

use std::path::Path;
use std::sync::OnceLock;

use chrono::Local;
use regex::Regex;
use tracing::warn;

use crate::error::CamToolResult;
use crate::toolpath::JobContext;

/// Line prefixes that only make sense on a printer.
const PRINTER_ONLY_PREFIXES: &[&str] = &[
    "M104", "M109", "M140", "M190", "M106", "M107", "M82", "; Filament",
];

/// Result of post-processing
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessOutput {
    /// Cleaned program text
    pub gcode: String,
    /// Lines dropped or rewritten
    pub removed_lines: usize,
}

fn extrusion_word() -> &'static Regex {
    static EXTRUSION_REGEX: OnceLock<Regex> = OnceLock::new();
    EXTRUSION_REGEX
        .get_or_init(|| Regex::new(r"\s*\bE[-+]?\d+(\.\d+)?").expect("invalid regex pattern"))
}

/// Clean printer-specific content out of a program
pub fn post_process(gcode: &str) -> PostProcessOutput {
    let mut out = String::new();
    out.push_str("; Post-processed by millkit for CNC milling\n");
    out.push_str(&format!("; Date: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));
    out.push_str("G21\n");
    out.push_str("G90\n");
    out.push_str("G17\n");
    out.push('\n');

    let mut removed = 0usize;
    for raw in gcode.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if PRINTER_ONLY_PREFIXES.iter().any(|p| line.starts_with(p)) {
            removed += 1;
            continue;
        }

        if extrusion_word().is_match(line) {
            let stripped = extrusion_word().replace_all(line, "");
            let stripped = stripped.trim();
            // A line that was only extrusion words is dropped.
            if !stripped.is_empty() {
                out.push_str(stripped);
                out.push('\n');
            }
            removed += 1;
            continue;
        }

        out.push_str(raw);
        out.push('\n');
    }

    out.push_str(&format!("; Removed 3D-printing specific lines: {}\n", removed));
    PostProcessOutput {
        gcode: out,
        removed_lines: removed,
    }
}

/// Post-process a G-code file in place
pub fn post_process_file(path: &Path, ctx: &JobContext) -> CamToolResult<usize> {
    let original = std::fs::read_to_string(path)?;
    let result = post_process(&original);
    std::fs::write(path, &result.gcode)?;

    if result.removed_lines > 0 {
        warn!(
            "Removed {} printer-specific lines from {}",
            result.removed_lines,
            path.display()
        );
    }
    ctx.report(&format!(
        "Post-processing complete: {} lines removed",
        result.removed_lines
    ));
    Ok(result.removed_lines)
}
