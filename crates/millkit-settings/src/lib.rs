//! Millkit Settings Crate
//!
//! Machining parameters, external slicer and playback preferences, with
//! JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, ExternalSlicerSettings, MachiningSettings, MillkitConfig,
    PlaybackSettings,
};
pub use error::{SettingsError, SettingsResult};
