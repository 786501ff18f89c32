//! Image space to planar world coordinates.

use crate::depth::Resolution;

/// Default horizontal half field of view (degrees).
pub const DEFAULT_FOV_X_DEG: f64 = 35.0;

/// Default vertical half field of view (degrees).
///
/// Never verified against the hardware datasheet; exposed in the config
/// so it can be calibrated.
pub const DEFAULT_FOV_Y_DEG: f64 = 26.25;

/// Pinhole projection parameters for one sensor mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub resolution: Resolution,
    /// Optical center column
    pub center_x: f64,
    /// Optical center row
    pub center_y: f64,
    /// tan of the horizontal half field of view
    pub tan_half_fov_x: f64,
    /// tan of the vertical half field of view
    pub tan_half_fov_y: f64,
}

impl ProjectionParams {
    /// Centered projection from half field-of-view angles in degrees.
    pub fn from_degrees(resolution: Resolution, fov_x_deg: f64, fov_y_deg: f64) -> Self {
        Self {
            resolution,
            center_x: resolution.width as f64 / 2.0,
            center_y: resolution.height as f64 / 2.0,
            tan_half_fov_x: fov_x_deg.to_radians().tan(),
            tan_half_fov_y: fov_y_deg.to_radians().tan(),
        }
    }

    /// Lateral offset (meters) of image column `pixel_x` at depth `z`.
    ///
    /// Positive values lie toward image column 0.
    #[inline]
    pub fn project_x(&self, pixel_x: i32, z: f64) -> f64 {
        let half_width = self.resolution.width as f64 / 2.0;
        (self.center_x - pixel_x as f64) * self.tan_half_fov_x / half_width * z
    }

    /// Vertical offset (meters) of image row `pixel_y` at depth `z`.
    ///
    /// Positive values lie above the optical axis.
    #[inline]
    pub fn project_y(&self, pixel_y: i32, z: f64) -> f64 {
        let half_height = self.resolution.height as f64 / 2.0;
        (self.center_y - pixel_y as f64) * self.tan_half_fov_y / half_height * z
    }

    /// Horizontal half extent visible at depth `z`.
    pub fn half_extent_x(&self, z: f64) -> f64 {
        self.project_x(0, z).abs()
    }

    /// Vertical half extent visible at depth `z`.
    pub fn half_extent_y(&self, z: f64) -> f64 {
        self.project_y(0, z).abs()
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::from_degrees(Resolution::MEDIUM, DEFAULT_FOV_X_DEG, DEFAULT_FOV_Y_DEG)
    }
}
