//! Depth frame types and data structures.

use std::fmt;

/// Raw sample value the sensor reports when a pixel has no return.
pub const NO_RETURN: u16 = 2047;

/// Largest raw code that encodes a distance.
pub const MAX_VALID_CODE: u16 = NO_RETURN - 1;

/// Depth image resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Medium depth mode (640x480), the only mode the sensor streams 11-bit depth in.
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// Number of samples in one frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One 11-bit depth frame, row-major.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    samples: Vec<u16>,
    resolution: Resolution,
    /// Sensor timestamp, monotonically increasing
    pub timestamp: u32,
}

impl DepthFrame {
    /// Wrap raw samples, checking the buffer length and the 11-bit range.
    pub fn new(resolution: Resolution, samples: Vec<u16>, timestamp: u32) -> Result<Self, FrameError> {
        let expected = resolution.pixel_count();
        if samples.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        if let Some((index, &value)) = samples.iter().enumerate().find(|&(_, &s)| s > NO_RETURN) {
            return Err(FrameError::SampleOutOfRange { index, value });
        }

        Ok(Self {
            samples,
            resolution,
            timestamp,
        })
    }

    /// Frame filled with a single raw value.
    pub fn filled(resolution: Resolution, value: u16, timestamp: u32) -> Result<Self, FrameError> {
        Self::new(resolution, vec![value; resolution.pixel_count()], timestamp)
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    /// Raw sample at image column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.resolution.width || y >= self.resolution.height {
            return None;
        }
        self.samples
            .get(y as usize * self.resolution.width as usize + x as usize)
            .copied()
    }

    /// One image row.
    pub fn row(&self, y: u32) -> Option<&[u16]> {
        if y >= self.resolution.height {
            return None;
        }
        let width = self.resolution.width as usize;
        let start = y as usize * width;
        self.samples.get(start..start + width)
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }
}

/// Faults that abort processing of a single frame.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer does not hold width * height samples
    #[error("Malformed depth frame: expected {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Frame resolution differs from the configured sensor mode
    #[error("Depth frame is {actual}, sensor mode is {expected}")]
    ResolutionMismatch {
        expected: Resolution,
        actual: Resolution,
    },

    /// Sample does not fit in 11 bits
    #[error("Depth sample {value} at index {index} exceeds the 11-bit range")]
    SampleOutOfRange { index: usize, value: u16 },
}
