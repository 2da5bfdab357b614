use millkit_settings::{MachiningSettings, MillkitConfig, SettingsError};
use std::path::PathBuf;
use tempfile::TempDir;

fn customized() -> MillkitConfig {
    let mut config = MillkitConfig::default();
    config.machining.tool_diameter = 6.35;
    config.machining.material = "MDF".to_string();
    config.external_slicer.executable = Some(PathBuf::from("/opt/slicer/bin/slicer"));
    config.external_slicer.timeout_secs = 120;
    config.playback.tick_interval_ms = 40;
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let config = customized();
    config.save_to_file(&path).unwrap();
    let loaded = MillkitConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let config = customized();
    config.save_to_file(&path).unwrap();
    let loaded = MillkitConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded.machining.material, "MDF");
    assert_eq!(loaded.external_slicer.timeout_secs, 120);
}

#[test]
fn test_save_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("millkit").join("config.toml");

    MillkitConfig::default().save_to_file(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let config = MillkitConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(config, MillkitConfig::default());
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[machining]\ncutting_feed_rate = 0.0\n").unwrap();

    let err = MillkitConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue { ref field, .. } if field == "cutting_feed_rate"));
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[machining\ntool_diameter = ").unwrap();

    let err = MillkitConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}

#[test]
fn test_save_refuses_invalid_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = MillkitConfig::default();
    config.machining = MachiningSettings {
        safe_height: f64::INFINITY,
        ..Default::default()
    };

    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}
