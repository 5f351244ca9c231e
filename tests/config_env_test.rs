//! Environment overrides for Settings.
//!
//! Kept in its own test binary: it mutates process environment variables.

use std::env;
use std::fs;

use tempfile::TempDir;

use sunburst::config::{local_config_path, Settings};

#[test]
fn given_env_vars_when_load_then_override_local_config() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "radius = 120.0\nframes = 6\n").unwrap();
    env::set_var("SUNBURST_RADIUS", "42.5");
    env::set_var("SUNBURST_FRAMES", "3");
    env::set_var("SUNBURST_PAD_ANGLE", "0.25");
    env::set_var("SUNBURST_LABEL_MIN_ANGLE", "0.5");

    // Act
    let loaded = Settings::load(Some(dir.path()));

    env::remove_var("SUNBURST_RADIUS");
    env::remove_var("SUNBURST_FRAMES");
    env::remove_var("SUNBURST_PAD_ANGLE");
    env::remove_var("SUNBURST_LABEL_MIN_ANGLE");

    // Assert
    let settings = loaded.expect("load settings");
    assert_eq!(settings.radius, 42.5);
    assert_eq!(settings.frames, 3);
    assert_eq!(settings.pad_angle, 0.25);
    assert_eq!(settings.label_min_angle, 0.5);
    assert_eq!(
        settings.label_min_thickness,
        Settings::default().label_min_thickness
    );
}
