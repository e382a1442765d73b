//! Panel configuration: defaults, caller overrides, and their merge.
//!
//! [`PanelConfig`] is built once from defaults and optionally merged with a
//! [`PanelOverrides`] overlay. Merge precedence is overlay over defaults,
//! recursively for `dimensions` and key-wise for `env`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SURFACE_TAG: &str = "omni-run-panel";
const DEFAULT_TITLE: &str = " Command Output ";
const DEFAULT_HIGHLIGHT: &str = "reset";
const DEFAULT_SHELL: &str = "sh";

/// Border drawn around the floating panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// No border.
    None,
    /// Single line.
    Single,
    /// Double line.
    Double,
    /// Single line with rounded corners.
    #[default]
    Rounded,
    /// Thick solid line.
    Solid,
    /// Drop shadow, drawn as a thick line on terminals.
    Shadow,
}

/// Fractional layout of the panel relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// Fraction of screen lines.
    pub height: f64,
    /// Fraction of screen columns.
    pub width: f64,
    /// Horizontal anchor, 0 = left, 1 = right.
    pub x: f64,
    /// Vertical anchor, 0 = top, 1 = bottom.
    pub y: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            height: 0.8,
            width: 0.8,
            x: 0.5,
            y: 0.5,
        }
    }
}

/// Effective panel configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    /// Display marker applied to every output surface.
    pub surface_tag: String,
    /// Border style of the panel window.
    pub border: BorderStyle,
    /// Accepted for compatibility; no transition reads it.
    pub auto_close: bool,
    /// Highlight color name for the panel.
    pub highlight: String,
    /// Opacity level, 0 (opaque) to 100.
    pub blend: u8,
    /// Start the command with an empty environment.
    pub clear_env: bool,
    /// Extra environment variables for the command.
    pub env: BTreeMap<String, String>,
    /// Fractional panel layout.
    pub dimensions: Dimensions,
    /// Program that runs the composed command line with `-c`.
    pub shell: String,
    /// Title shown in the panel border.
    pub title: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            surface_tag: DEFAULT_SURFACE_TAG.to_string(),
            border: BorderStyle::default(),
            auto_close: false,
            highlight: DEFAULT_HIGHLIGHT.to_string(),
            blend: 0,
            clear_env: false,
            env: BTreeMap::new(),
            dimensions: Dimensions::default(),
            shell: DEFAULT_SHELL.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Caller-supplied overrides. Absent fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[allow(missing_docs)]
pub struct PanelOverrides {
    pub surface_tag: Option<String>,
    pub border: Option<BorderStyle>,
    pub auto_close: Option<bool>,
    pub highlight: Option<String>,
    pub blend: Option<u8>,
    pub clear_env: Option<bool>,
    /// Merged key-wise into the default environment.
    pub env: Option<BTreeMap<String, String>>,
    /// Merged field by field.
    pub dimensions: Option<DimensionOverrides>,
    pub shell: Option<String>,
    pub title: Option<String>,
}

/// Overrides for [`Dimensions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[allow(missing_docs)]
pub struct DimensionOverrides {
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl PanelConfig {
    /// Merge an overlay into this configuration, overlay wins.
    #[must_use]
    pub fn merge(self, overlay: PanelOverrides) -> Self {
        let mut env = self.env;
        if let Some(extra) = overlay.env {
            env.extend(extra);
        }
        Self {
            surface_tag: overlay.surface_tag.unwrap_or(self.surface_tag),
            border: overlay.border.unwrap_or(self.border),
            auto_close: overlay.auto_close.unwrap_or(self.auto_close),
            highlight: overlay.highlight.unwrap_or(self.highlight),
            blend: overlay.blend.unwrap_or(self.blend),
            clear_env: overlay.clear_env.unwrap_or(self.clear_env),
            env,
            dimensions: match overlay.dimensions {
                Some(dims) => self.dimensions.merge(dims),
                None => self.dimensions,
            },
            shell: overlay.shell.unwrap_or(self.shell),
            title: overlay.title.unwrap_or(self.title),
        }
    }

    /// Check option values the core accepts unchecked.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = &self.dimensions;
        for (field, value) in [
            ("dimensions.height", dims.height),
            ("dimensions.width", dims.width),
            ("dimensions.x", dims.x),
            ("dimensions.y", dims.y),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidFraction { field, value });
            }
        }
        if self.blend > 100 {
            return Err(ConfigError::InvalidBlend(self.blend));
        }
        if self.shell.trim().is_empty() {
            return Err(ConfigError::EmptyShell);
        }
        Ok(())
    }
}

impl Dimensions {
    fn merge(self, overlay: DimensionOverrides) -> Self {
        Self {
            height: overlay.height.unwrap_or(self.height),
            width: overlay.width.unwrap_or(self.width),
            x: overlay.x.unwrap_or(self.x),
            y: overlay.y.unwrap_or(self.y),
        }
    }
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Layout fraction outside (0, 1].
    #[error("{field} must be in (0, 1], got {value}")]
    InvalidFraction {
        /// Offending option.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Blend level above 100.
    #[error("blend must be in 0..=100, got {0}")]
    InvalidBlend(u8),

    /// Shell program is blank.
    #[error("shell must not be empty")]
    EmptyShell,

    /// Config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Config file is not valid YAML for [`PanelOverrides`].
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}

/// Load overrides from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
pub fn load_overrides(path: &Path) -> Result<PanelOverrides, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str::<PanelOverrides>(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overlay_keeps_defaults() {
        let merged = PanelConfig::default().merge(PanelOverrides::default());
        assert_eq!(merged, PanelConfig::default());
    }

    #[test]
    fn test_overlay_wins_on_present_keys() {
        let overlay = PanelOverrides {
            border: Some(BorderStyle::Double),
            blend: Some(30),
            auto_close: Some(true),
            ..Default::default()
        };
        let merged = PanelConfig::default().merge(overlay);
        assert_eq!(merged.border, BorderStyle::Double);
        assert_eq!(merged.blend, 30);
        assert!(merged.auto_close);
        assert_eq!(merged.surface_tag, DEFAULT_SURFACE_TAG);
        assert_eq!(merged.shell, DEFAULT_SHELL);
    }

    #[test]
    fn test_nested_dimensions_merge_per_field() {
        let overlay = PanelOverrides {
            dimensions: Some(DimensionOverrides {
                height: Some(0.4),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = PanelConfig::default().merge(overlay);
        let defaults = Dimensions::default();
        assert!((merged.dimensions.height - 0.4).abs() < f64::EPSILON);
        assert!((merged.dimensions.width - defaults.width).abs() < f64::EPSILON);
        assert!((merged.dimensions.x - defaults.x).abs() < f64::EPSILON);
        assert!((merged.dimensions.y - defaults.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_env_merges_key_wise() {
        let mut base = PanelConfig::default();
        base.env.insert("KEEP".to_string(), "1".to_string());
        base.env.insert("REPLACE".to_string(), "old".to_string());

        let overlay = PanelOverrides {
            env: Some(BTreeMap::from([("REPLACE".to_string(), "new".to_string())])),
            ..Default::default()
        };
        let merged = base.merge(overlay);
        assert_eq!(merged.env.get("KEEP").map(String::as_str), Some("1"));
        assert_eq!(merged.env.get("REPLACE").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_fraction() {
        let mut config = PanelConfig::default();
        config.dimensions.width = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFraction {
                field: "dimensions.width",
                ..
            }
        ));

        config.dimensions.width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blend_and_shell() {
        let mut config = PanelConfig::default();
        config.blend = 101;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBlend(101))));

        let mut config = PanelConfig::default();
        config.shell = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyShell)));

        assert!(PanelConfig::default().validate().is_ok());
    }
}
