//! # G-code Emitter
//!
//! Serializes toolpaths into a milling program: fixed setup block, one
//! plunge/cut/retract sequence per toolpath, fixed shutdown block.
//!
//! Y coordinates are sign-inverted on output to match the machine's
//! coordinate convention.

use chrono::Local;
use millkit_settings::MachiningSettings;

use crate::toolpath::Toolpath;

/// Generator for milling G-code from toolpaths
pub struct GcodeEmitter {
    settings: MachiningSettings,
    include_timestamp: bool,
}

impl GcodeEmitter {
    /// Create a new GcodeEmitter for the given machining settings
    pub fn new(settings: MachiningSettings) -> Self {
        Self {
            settings,
            include_timestamp: true,
        }
    }

    /// Omit the generation date from the header (reproducible output)
    pub fn without_timestamp(mut self) -> Self {
        self.include_timestamp = false;
        self
    }

    /// Generate the complete program
    pub fn generate(&self, toolpaths: &[Toolpath]) -> String {
        let mut gcode = String::new();
        self.write_preamble(&mut gcode);
        for toolpath in toolpaths.iter().filter(|tp| tp.is_usable()) {
            self.write_toolpath(&mut gcode, toolpath);
        }
        self.write_postamble(&mut gcode);
        gcode
    }

    fn write_preamble(&self, gcode: &mut String) {
        let s = &self.settings;

        // Header
        gcode.push_str("; G-code generated by millkit (internal CAM engine)\n");
        gcode.push_str(&format!(
            "; Area: {}x{}x{} mm | Tool: D{} mm | Material: {}\n",
            s.work_area_x, s.work_area_y, s.work_area_z, s.tool_diameter, s.material
        ));
        if self.include_timestamp {
            gcode.push_str(&format!(
                "; Date: {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ));
        }
        gcode.push('\n');

        // Initialization
        gcode.push_str("G21 ; Set units to millimeters\n");
        gcode.push_str("G90 ; Absolute positioning\n");
        gcode.push_str("G17 ; XY plane\n");
        gcode.push_str("G94 ; Feed per minute\n");
        gcode.push('\n');
        gcode.push_str("G28 ; Home all axes\n");
        self.write_retract(gcode);
        gcode.push('\n');
        gcode.push_str(&format!("M3 S{:.0} ; Start spindle\n", s.spindle_speed()));
        gcode.push_str("G4 P1 ; Wait for spindle\n");
        gcode.push('\n');
    }

    fn write_toolpath(&self, gcode: &mut String, toolpath: &Toolpath) {
        let s = &self.settings;
        let Some((first, rest)) = toolpath.points.split_first() else {
            return;
        };

        gcode.push_str(&format!("; {}\n", toolpath.comment));
        gcode.push_str(&format!(
            "G0 X{} Y{} F{:.1}\n",
            coord(first.x),
            coord(-first.y),
            s.rapid_feed_rate
        ));
        self.write_retract(gcode);
        gcode.push_str(&format!(
            "G1 Z{} F{:.1}\n",
            coord(first.z),
            s.plunge_feed_rate
        ));

        for p in rest {
            gcode.push_str(&format!(
                "G1 X{} Y{} Z{} F{:.1}\n",
                coord(p.x),
                coord(-p.y),
                coord(p.z),
                toolpath.feed_rate
            ));
        }

        self.write_retract(gcode);
        gcode.push('\n');
    }

    fn write_postamble(&self, gcode: &mut String) {
        gcode.push_str("M5 ; Stop spindle\n");
        self.write_retract(gcode);
        gcode.push_str(&format!(
            "G0 X0 Y0 F{:.1} ; Return to origin\n",
            self.settings.rapid_feed_rate
        ));
        gcode.push_str("M2 ; End program\n");
    }

    fn write_retract(&self, gcode: &mut String) {
        gcode.push_str(&format!(
            "G0 Z{} F{:.1}\n",
            coord(self.settings.safe_height),
            self.settings.rapid_feed_rate
        ));
    }
}

/// Three-decimal coordinate without a negative zero.
fn coord(value: f64) -> String {
    let text = format!("{:.3}", value);
    if text == "-0.000" {
        "0.000".to_string()
    } else {
        text
    }
}
