//! Depth sources.
//!
//! A [`DepthSensor`] delivers frames to a [`FrameHandler`] one at a time and
//! exposes the status LED. Two sources are provided: [`ReplaySensor`] plays
//! back raw recordings and [`SyntheticSensor`] generates a test scene.

mod pacing;
mod replay;
mod synthetic;
mod types;

pub use pacing::FramePacer;
pub use replay::{encode_frames, ReplaySensor};
pub use synthetic::{SyntheticSensor, BOX_DISTANCE, CYCLE_FRAMES, DROPOUT_FRAMES, WALL_DISTANCE};
pub use types::{DepthSensor, FrameHandler, LedState, SensorError, SensorStatus};
