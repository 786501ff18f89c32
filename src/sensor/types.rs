//! Sensor abstractions shared by every depth source.

use std::fmt;
use std::path::PathBuf;

use crate::depth::{DepthFrame, FrameError};
use crate::radar::{Radar, RadarError};

/// Sensor status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedState {
    #[default]
    Off,
    Green,
    BlinkRedYellow,
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedState::Off => write!(f, "off"),
            LedState::Green => write!(f, "green"),
            LedState::BlinkRedYellow => write!(f, "blinking red/yellow"),
        }
    }
}

/// Outcome of one `process_events` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStatus {
    /// A frame was delivered to the handler
    Frame,
    /// Nothing arrived this time
    Idle,
    /// The stream is over
    Ended,
}

/// Receives frames from a sensor, one call per frame, run to completion.
pub trait FrameHandler {
    fn on_depth(&mut self, frame: &DepthFrame) -> Result<(), RadarError>;
}

impl<W: std::io::Write> FrameHandler for Radar<W> {
    fn on_depth(&mut self, frame: &DepthFrame) -> Result<(), RadarError> {
        Radar::on_depth(self, frame).map(|_| ())
    }
}

/// A source of depth frames with a controllable status LED.
pub trait DepthSensor {
    /// Block until the next frame (or end of stream) and hand it to `handler`.
    ///
    /// Device state must not be changed from inside the handler; callers
    /// adjust the LED between calls.
    fn process_events(&mut self, handler: &mut dyn FrameHandler) -> Result<SensorStatus, SensorError>;

    fn set_led(&mut self, led: LedState) -> Result<(), SensorError>;
}

/// Errors from a depth source.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Failed to open depth recording '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read depth data: {0}")]
    Io(#[from] std::io::Error),

    /// The sensor produced a frame that could not be decoded
    #[error("Bad depth frame: {0}")]
    Frame(#[from] FrameError),

    /// The frame handler rejected a frame
    #[error(transparent)]
    Handler(#[from] RadarError),
}

impl SensorError {
    /// Whether the error only spoils the current frame.
    pub fn is_frame_fault(&self) -> bool {
        matches!(
            self,
            SensorError::Frame(_) | SensorError::Handler(RadarError::Frame(_))
        )
    }
}
