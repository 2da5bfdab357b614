//! Configuration and settings management for Millkit
//!
//! Provides machining parameters, configuration file handling and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Machining parameters (work area, tool, feeds, spindle, heights)
//! - External slicer integration (executable, timeout)
//! - Playback preferences (tick interval, rapid speed-up)

use millkit_core::ScanAxis;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

/// Machining parameters consumed by the CAM engine
///
/// All lengths are millimetres, feeds mm/min, spindle speeds RPM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachiningSettings {
    /// Work area extent along X
    pub work_area_x: f64,
    /// Work area extent along Y
    pub work_area_y: f64,
    /// Work area extent along Z; roughing never starts above it
    pub work_area_z: f64,
    /// Minimum sampling granularity for layers, stepover and raster samples
    pub step_resolution: f64,
    /// Cutter diameter
    pub tool_diameter: f64,
    /// Maximum spindle speed the machine supports
    pub max_spindle_speed: f64,
    /// Requested spindle speed, capped at `max_spindle_speed` on output
    pub working_spindle_speed: f64,
    /// Depth of each roughing pass
    pub cutting_depth: f64,
    /// Feed rate for cutting moves
    pub cutting_feed_rate: f64,
    /// Feed rate for plunging into the material
    pub plunge_feed_rate: f64,
    /// Feed rate written on rapid moves
    pub rapid_feed_rate: f64,
    /// Perimeter count passed to the external slicer
    pub perimeters: u32,
    /// Infill density in percent passed to the external slicer
    pub fill_density: u32,
    /// Infill pattern name passed to the external slicer
    pub fill_pattern: String,
    /// Height for unobstructed rapid travel
    pub safe_height: f64,
    /// Stock material, informational only
    pub material: String,
    /// Raster direction for the finishing pass
    pub finishing_axis: ScanAxis,
}

impl Default for MachiningSettings {
    fn default() -> Self {
        Self {
            work_area_x: 300.0,
            work_area_y: 300.0,
            work_area_z: 100.0,
            step_resolution: 0.1,
            tool_diameter: 5.0,
            max_spindle_speed: 10000.0,
            working_spindle_speed: 8000.0,
            cutting_depth: 1.0,
            cutting_feed_rate: 1500.0,
            plunge_feed_rate: 500.0,
            rapid_feed_rate: 3000.0,
            perimeters: 2,
            fill_density: 50,
            fill_pattern: "concentric".to_string(),
            safe_height: 50.0,
            material: "Wood".to_string(),
            finishing_axis: ScanAxis::X,
        }
    }
}

impl MachiningSettings {
    /// Spindle speed actually commanded: the working speed capped at the maximum.
    pub fn spindle_speed(&self) -> f64 {
        self.working_spindle_speed.min(self.max_spindle_speed)
    }

    /// Check that every dimension, feed and speed is usable.
    pub fn validate(&self) -> SettingsResult<()> {
        let positive = [
            ("work_area_x", self.work_area_x),
            ("work_area_y", self.work_area_y),
            ("work_area_z", self.work_area_z),
            ("step_resolution", self.step_resolution),
            ("tool_diameter", self.tool_diameter),
            ("cutting_depth", self.cutting_depth),
            ("cutting_feed_rate", self.cutting_feed_rate),
            ("plunge_feed_rate", self.plunge_feed_rate),
            ("rapid_feed_rate", self.rapid_feed_rate),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::invalid(field, format!("must be > 0, got {}", value)));
            }
        }

        if !(self.max_spindle_speed.is_finite() && self.max_spindle_speed >= 0.0) {
            return Err(SettingsError::invalid("max_spindle_speed", "must be >= 0"));
        }
        if !(self.working_spindle_speed.is_finite() && self.working_spindle_speed >= 0.0) {
            return Err(SettingsError::invalid("working_spindle_speed", "must be >= 0"));
        }
        if self.working_spindle_speed > 0.0 && self.max_spindle_speed == 0.0 {
            return Err(SettingsError::invalid(
                "max_spindle_speed",
                "must be > 0 when a working spindle speed is set",
            ));
        }

        if !self.safe_height.is_finite() {
            return Err(SettingsError::invalid("safe_height", "must be finite"));
        }
        if self.fill_density > 100 {
            return Err(SettingsError::invalid("fill_density", "must be a percentage (0..=100)"));
        }

        Ok(())
    }

    /// Render the slicer profile handed to an external slicer via `--load`.
    pub fn to_ini(&self) -> String {
        let mut ini = String::new();
        let _ = writeln!(ini, "; Temporary config generated by millkit");
        let _ = writeln!(ini, "[print_settings]");
        let _ = writeln!(ini, "layer_height = {}", self.cutting_depth);
        let _ = writeln!(ini, "first_layer_height = {}", self.cutting_depth);
        let _ = writeln!(ini, "perimeters = {}", self.perimeters);
        let _ = writeln!(ini, "top_solid_layers = 0");
        let _ = writeln!(ini, "bottom_solid_layers = 1");
        let _ = writeln!(ini, "fill_density = {}%", self.fill_density);
        let _ = writeln!(ini, "fill_pattern = {}", self.fill_pattern);
        let _ = writeln!(ini, "solid_infill_every_layers = 1");
        let _ = writeln!(ini, "infill_speed = {}", self.cutting_feed_rate);
        let _ = writeln!(ini, "perimeter_speed = {}", self.cutting_feed_rate);
        let _ = writeln!(ini, "travel_speed = {}", self.rapid_feed_rate);
        let _ = writeln!(ini, "first_layer_speed = {}", self.plunge_feed_rate);
        let _ = writeln!(ini);
        let _ = writeln!(ini, "[printer_settings]");
        let _ = writeln!(ini, "temperature = 0");
        let _ = writeln!(ini, "bed_temperature = 0");
        let _ = writeln!(ini, "nozzle_diameter = {}", self.tool_diameter);
        ini
    }
}

/// External slicer integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSlicerSettings {
    /// Slicer executable; the internal engine is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    /// Hard limit on the slicer's run time in seconds
    pub timeout_secs: u64,
}

impl Default for ExternalSlicerSettings {
    fn default() -> Self {
        Self {
            executable: None,
            timeout_secs: 300,
        }
    }
}

impl ExternalSlicerSettings {
    /// The configured executable, if it points at an existing file.
    pub fn usable_executable(&self) -> Option<&Path> {
        self.executable.as_deref().filter(|p| p.is_file())
    }
}

/// Playback preferences for the motion simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Timer period between animation ticks
    pub tick_interval_ms: u64,
    /// Rapid moves are animated this many times faster than planned
    pub rapid_speedup: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 25,
            rapid_speedup: 2.0,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MillkitConfig {
    /// Machining parameters
    pub machining: MachiningSettings,
    /// External slicer integration
    pub external_slicer: ExternalSlicerSettings,
    /// Playback preferences
    pub playback: PlaybackSettings,
}

impl MillkitConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load from `path`, or fall back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.machining.validate()?;

        if self.external_slicer.timeout_secs == 0 {
            return Err(SettingsError::invalid("external_slicer.timeout_secs", "must be > 0"));
        }

        if self.playback.tick_interval_ms == 0 {
            return Err(SettingsError::invalid("playback.tick_interval_ms", "must be > 0"));
        }
        if !(self.playback.rapid_speedup.is_finite() && self.playback.rapid_speedup > 0.0) {
            return Err(SettingsError::invalid("playback.rapid_speedup", "must be > 0"));
        }

        Ok(())
    }

    /// Render as TOML for display
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Default location of the user config file: `<config dir>/millkit/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("millkit").join("config.toml"))
        .ok_or(SettingsError::ConfigDirectoryUnavailable)
}

enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
