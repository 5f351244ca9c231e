//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sunburst/sunburst.toml`
//! 3. Local config: `<dir>/.sunburst.toml` (current directory unless given)
//! 4. Environment variables: `SUNBURST_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{LabelRule, PartitionConfig};

/// Effective settings for layout, labels and transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Outer radius of the chart
    pub radius: f64,
    /// Angular padding removed from rendered sectors (radians)
    pub pad_angle: f64,
    /// Minimum angular span for a label (radians)
    pub label_min_angle: f64,
    /// Minimum ring thickness for a label
    pub label_min_thickness: f64,
    /// Frames sampled per zoom transition
    pub frames: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let layout = PartitionConfig::default();
        let labels = LabelRule::default();
        Self {
            radius: layout.radius,
            pad_angle: layout.pad_angle,
            label_min_angle: labels.min_angle,
            label_min_thickness: labels.min_thickness,
            frames: 10,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub radius: Option<f64>,
    pub pad_angle: Option<f64>,
    pub label_min_angle: Option<f64>,
    pub label_min_thickness: Option<f64>,
    pub frames: Option<usize>,
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Get the XDG config directory for sunburst.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sunburst").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sunburst.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".sunburst.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            radius: overlay.radius.unwrap_or(self.radius),
            pad_angle: overlay.pad_angle.unwrap_or(self.pad_angle),
            label_min_angle: overlay.label_min_angle.unwrap_or(self.label_min_angle),
            label_min_thickness: overlay
                .label_min_thickness
                .unwrap_or(self.label_min_thickness),
            frames: overlay.frames.unwrap_or(self.frames),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.sunburst.toml`; skipped when `None`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply SUNBURST_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SUNBURST")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_float("radius") {
            settings.radius = val;
        }
        if let Ok(val) = config.get_float("pad_angle") {
            settings.pad_angle = val;
        }
        if let Ok(val) = config.get_float("label_min_angle") {
            settings.label_min_angle = val;
        }
        if let Ok(val) = config.get_float("label_min_thickness") {
            settings.label_min_thickness = val;
        }
        if let Ok(val) = config.get_int("frames") {
            settings.frames = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("frames must be non-negative, got {}", val),
            })?;
        }

        Ok(settings)
    }

    /// Reject values the layout cannot use.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.partition_config()
            .validate()
            .map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })?;
        for (field, value) in [
            ("label_min_angle", self.label_min_angle),
            ("label_min_thickness", self.label_min_thickness),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ApplicationError::Config {
                    message: format!("{} must be a non-negative number, got {}", field, value),
                });
            }
        }
        if self.frames == 0 {
            return Err(ApplicationError::Config {
                message: "frames must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn partition_config(&self) -> PartitionConfig {
        PartitionConfig {
            radius: self.radius,
            pad_angle: self.pad_angle,
        }
    }

    pub fn label_rule(&self) -> LabelRule {
        LabelRule {
            min_angle: self.label_min_angle,
            min_thickness: self.label_min_thickness,
        }
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
