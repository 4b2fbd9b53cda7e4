//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Projection and frame clear settings.
    pub render: RenderConfig,
    /// Pointer, wheel and touch tuning for the camera.
    pub camera: CameraConfig,
    /// Orbital clock and visibility settings.
    pub simulation: SimulationConfig,
    /// Where textures are read from.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Clear colour as linear RGBA.
    pub clear_color: [f64; 4],
}

/// Camera controller tuning.
///
/// Zoom is a negative distance along the view axis, so `zoom_min` is the
/// farthest the camera can pull out and `zoom_max` the closest it can get.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Base drag speed for panning.
    pub move_speed: f32,
    /// Multiplier applied on top of `move_speed` per pixel of drag.
    pub pan_factor: f32,
    /// Radians per pixel for secondary-button drag rotation.
    pub mouse_rotate_speed: f32,
    /// Radians per pixel for single-finger rotation.
    pub touch_rotate_speed: f32,
    /// Zoom units per wheel delta unit.
    pub wheel_zoom_speed: f32,
    /// Zoom units per pixel of pinch distance change.
    pub pinch_zoom_speed: f32,
    /// Farthest zoom distance (most negative).
    pub zoom_min: f32,
    /// Closest zoom distance.
    pub zoom_max: f32,
    /// Zoom distance at startup.
    pub initial_zoom: f32,
    /// Delay before a lifted finger may rotate the camera again.
    pub touch_rotate_grace_ms: u64,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Start with the orbital clock paused.
    pub start_paused: bool,
    /// Outer bodies are drawn only while zoom is below this value.
    pub lod_zoom_threshold: f32,
}

/// Asset locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the body textures (`sun.jpg`, `earth.jpg`, ...).
    pub texture_dir: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 200.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.5,
            pan_factor: 0.05,
            mouse_rotate_speed: 0.01,
            touch_rotate_speed: 0.03,
            wheel_zoom_speed: 0.01,
            pinch_zoom_speed: 0.01,
            zoom_min: -100.0,
            zoom_max: -3.0,
            initial_zoom: -3.0,
            touch_rotate_grace_ms: 1000,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_paused: false,
            lod_zoom_threshold: -10.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("textures"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl CameraConfig {
    /// Check that the zoom range is non-empty and every speed is finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zoom_min.is_finite() || !self.zoom_max.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "camera.zoom_min/zoom_max",
                reason: "zoom bounds must be finite".to_string(),
            });
        }
        if self.zoom_min >= self.zoom_max {
            return Err(ConfigError::InvalidValue {
                field: "camera.zoom_min",
                reason: format!(
                    "zoom_min ({}) must be below zoom_max ({})",
                    self.zoom_min, self.zoom_max
                ),
            });
        }
        let speeds = [
            ("camera.move_speed", self.move_speed),
            ("camera.pan_factor", self.pan_factor),
            ("camera.mouse_rotate_speed", self.mouse_rotate_speed),
            ("camera.touch_rotate_speed", self.touch_rotate_speed),
            ("camera.wheel_zoom_speed", self.wheel_zoom_speed),
            ("camera.pinch_zoom_speed", self.pinch_zoom_speed),
        ];
        for (field, value) in speeds {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{value} is not finite"),
                });
            }
        }
        Ok(())
    }

    /// Starting zoom pulled into the configured range.
    #[must_use]
    pub fn clamped_initial_zoom(&self) -> f32 {
        self.initial_zoom.clamp(self.zoom_min, self.zoom_max)
    }
}

impl RenderConfig {
    /// Check that the projection parameters describe a usable frustum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::InvalidValue {
                field: "render.fov_y_degrees",
                reason: format!("{} is outside (0, 180)", self.fov_y_degrees),
            });
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::InvalidValue {
                field: "render.near/far",
                reason: format!("need 0 < near < far, got {} and {}", self.near, self.far),
            });
        }
        Ok(())
    }
}

impl Config {
    /// Validate every section that has constraints beyond its type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.validate()?;
        self.camera.validate()?;
        Ok(())
    }
}

// --- Load / Save / Reload ---

const CONFIG_FILE: &str = "config.ron";

/// Read, parse and validate one config file.
fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default settings to {}", path.display());
            return Ok(config);
        }
        let config = read_config(&path)?;
        log::info!("Using settings from {}", path.display());
        Ok(config)
    }

    /// Write `config.ron` into `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Encode)?;
        std::fs::write(&path, text).map_err(write_err)
    }

    /// Re-read `config.ron`; `Some` only when the contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Settings changed on disk");
        Ok(Some(fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("touch_rotate_grace_ms: 1000"));
    }

    #[test]
    fn test_defaults_match_viewer_constants() {
        let config = Config::default();
        assert_eq!(config.render.fov_y_degrees, 45.0);
        assert_eq!(config.render.near, 0.1);
        assert_eq!(config.render.far, 200.0);
        assert_eq!(config.camera.zoom_min, -100.0);
        assert_eq!(config.camera.zoom_max, -3.0);
        assert_eq!(config.simulation.lod_zoom_threshold, -10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (width: 800))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_zoom_range_rejected() {
        let mut camera = CameraConfig::default();
        camera.zoom_min = -3.0;
        camera.zoom_max = -50.0;
        assert!(matches!(
            camera.validate(),
            Err(ConfigError::InvalidValue { field: "camera.zoom_min", .. })
        ));
    }

    #[test]
    fn test_non_finite_speed_rejected() {
        let mut camera = CameraConfig::default();
        camera.pinch_zoom_speed = f32::NAN;
        assert!(camera.validate().is_err());
    }

    #[test]
    fn test_bad_frustum_rejected() {
        let mut render = RenderConfig::default();
        render.near = 10.0;
        render.far = 5.0;
        assert!(render.validate().is_err());
    }

    #[test]
    fn test_initial_zoom_clamped_into_range() {
        let mut camera = CameraConfig::default();
        camera.initial_zoom = 12.0;
        assert_eq!(camera.clamped_initial_zoom(), -3.0);
        camera.initial_zoom = -500.0;
        assert_eq!(camera.clamped_initial_zoom(), -100.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.simulation.start_paused = true;
        config.assets.texture_dir = PathBuf::from("/opt/orrery/textures");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(camera: (zoom_min: 5.0, zoom_max: -3.0))",
        )
        .unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.camera.wheel_zoom_speed = 0.02;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().camera.wheel_zoom_speed, 0.02);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, "{{not valid}}").unwrap();
        match Config::load_or_create(dir.path()) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_reload_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::default().reload(dir.path());
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
