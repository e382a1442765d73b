//! Configuration loading and merge precedence.

use std::fs;

use omni_run_panel::{BorderStyle, ConfigError, Dimensions, PanelConfig, load_overrides};
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("panel.yaml");
    fs::write(&path, body).unwrap();
    path
}

/// Test: YAML overrides only replace the keys they name
#[test]
fn test_yaml_overrides_merge_over_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "border: double\nblend: 20\ndimensions:\n  height: 0.5\nenv:\n  SF_LOG_LEVEL: debug\n",
    );

    let overrides = load_overrides(&path).unwrap();
    let config = PanelConfig::default().merge(overrides);
    let defaults = PanelConfig::default();

    assert_eq!(config.border, BorderStyle::Double);
    assert_eq!(config.blend, 20);
    assert!((config.dimensions.height - 0.5).abs() < f64::EPSILON);
    assert!((config.dimensions.width - Dimensions::default().width).abs() < f64::EPSILON);
    assert_eq!(
        config.env.get("SF_LOG_LEVEL").map(String::as_str),
        Some("debug")
    );
    assert_eq!(config.surface_tag, defaults.surface_tag);
    assert_eq!(config.highlight, defaults.highlight);
    assert_eq!(config.auto_close, defaults.auto_close);
    assert_eq!(config.clear_env, defaults.clear_env);
    assert_eq!(config.title, defaults.title);
    assert!(config.validate().is_ok());
}

/// Test: empty file means no overrides
#[test]
fn test_empty_mapping_is_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "{}\n");
    let config = PanelConfig::default().merge(load_overrides(&path).unwrap());
    assert_eq!(config, PanelConfig::default());
}

/// Test: missing file
#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = load_overrides(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

/// Test: malformed file
#[test]
fn test_bad_yaml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "border: sideways\n");
    let err = load_overrides(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("panel.yaml"));
}

/// Test: loading does not validate, validate does
#[test]
fn test_out_of_range_values_load_but_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "dimensions:\n  width: 1.5\n");
    let config = PanelConfig::default().merge(load_overrides(&path).unwrap());
    assert!((config.dimensions.width - 1.5).abs() < f64::EPSILON);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidFraction { .. })
    ));
}
