//! Configuration file handling for kinradar.
//!
//! Loads configuration from `~/.config/kinradar/config.toml` or a custom path.
//! Every field has a default, so a missing file or table is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::depth::Resolution;
use crate::radar::{
    DisplayMode, GridSpec, GridSpecError, ProjectionParams, RadarSettings, ScanWindow,
    DEFAULT_FOV_X_DEG, DEFAULT_FOV_Y_DEG,
};

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub clip: ClipConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub width: u32,
    pub height: u32,
    /// Horizontal half field of view in degrees
    pub fov_x: f64,
    /// Vertical half field of view in degrees
    pub fov_y: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            width: Resolution::MEDIUM.width,
            height: Resolution::MEDIUM.height,
            fov_x: DEFAULT_FOV_X_DEG,
            fov_y: DEFAULT_FOV_Y_DEG,
        }
    }
}

/// Image rows to scan. Unset bounds cover the whole frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    pub top: Option<i64>,
    pub bottom: Option<i64>,
}

/// Clip planes in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    pub near: f64,
    pub far: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self { near: 0.0, far: 6.0 }
    }
}

/// Bin counts for both grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Overhead grid columns
    pub top_lateral: usize,
    /// Overhead grid rows
    pub top_depth: usize,
    /// Side grid columns (drawn as rows)
    pub side_vertical: usize,
    /// Side grid depth rows (drawn as columns)
    pub side_depth: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            top_lateral: 65,
            top_depth: 32,
            side_vertical: 32,
            side_depth: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
}

/// Commented config written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# kinradar configuration

[sensor]
# Depth image size in pixels
width = 640
height = 480
# Half field of view in degrees
fov_x = 35.0
fov_y = 26.25

[scan]
# Image rows to scan (bottom is exclusive). Default: whole frame
# top = 0
# bottom = 480

[clip]
# Clip planes in meters
near = 0.0
far = 6.0

[grid]
# Overhead view: lateral and depth bins
top_lateral = 65
top_depth = 32
# Side view: vertical and depth bins
side_vertical = 32
side_depth = 80

[display]
# both, top or side
mode = "both"
"#;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.sensor.width,
            height: self.sensor.height,
        }
    }

    /// The effective config as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate and derive everything the radar needs.
    ///
    /// Lateral extents come from projecting the image edge at the far plane.
    pub fn settings(&self) -> Result<RadarSettings, ConfigError> {
        let resolution = self.resolution();
        if resolution.width == 0 || resolution.height == 0 {
            return Err(ConfigError::Resolution(resolution));
        }
        for (axis, degrees) in [("x", self.sensor.fov_x), ("y", self.sensor.fov_y)] {
            if !(degrees > 0.0 && degrees < 90.0) {
                return Err(ConfigError::FieldOfView { axis, degrees });
            }
        }

        let top = self.scan.top.unwrap_or(0);
        let bottom = self.scan.bottom.unwrap_or(i64::from(resolution.height));
        let window = ScanWindow::clamped(top, bottom, resolution.height);
        if window.rows() == 0 {
            return Err(ConfigError::EmptyScanWindow { top, bottom });
        }

        let projection = ProjectionParams::from_degrees(resolution, self.sensor.fov_x, self.sensor.fov_y);
        let (near, far) = (self.clip.near, self.clip.far);

        let top_grid = GridSpec::new(
            self.grid.top_lateral,
            self.grid.top_depth,
            near,
            far,
            projection.half_extent_x(far),
        )?;
        let side_grid = GridSpec::new(
            self.grid.side_vertical,
            self.grid.side_depth,
            near,
            far,
            projection.half_extent_y(far),
        )?;

        Ok(RadarSettings {
            projection,
            window,
            top: top_grid,
            side: side_grid,
            mode: self.display.mode,
        })
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid sensor resolution {0}")]
    Resolution(Resolution),

    #[error("Field of view {axis} must be between 0 and 90 degrees, got {degrees}")]
    FieldOfView { axis: &'static str, degrees: f64 },

    #[error("Scan window {top}..{bottom} contains no rows")]
    EmptyScanWindow { top: i64, bottom: i64 },

    #[error("Invalid grid: {0}")]
    Grid(#[from] GridSpecError),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("kinradar").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".kinradar.toml"))
}
