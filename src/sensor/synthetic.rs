//! Generated depth scene for running without hardware.
//!
//! The scene has a back wall, a box swaying left and right in front of it
//! and a strip of sky along the top that never returns. Once per cycle the
//! sensor "loses" most of the scene so the out-of-range path gets exercised.

use crate::depth::{DepthFrame, DepthLut, Resolution, NO_RETURN};

use super::pacing::FramePacer;
use super::types::{DepthSensor, FrameHandler, LedState, SensorError, SensorStatus};

/// Distance of the back wall in meters.
pub const WALL_DISTANCE: f64 = 4.0;

/// Distance of the box in meters.
pub const BOX_DISTANCE: f64 = 1.5;

/// Frames per scene cycle.
pub const CYCLE_FRAMES: u32 = 240;

/// Frames at the end of each cycle during which most samples are lost.
pub const DROPOUT_FRAMES: u32 = 40;

/// Deterministic synthetic depth source.
#[derive(Debug)]
pub struct SyntheticSensor {
    resolution: Resolution,
    wall_code: u16,
    box_code: u16,
    pacer: FramePacer,
    max_frames: Option<u32>,
    next_index: u32,
    led: LedState,
}

impl SyntheticSensor {
    pub fn new(resolution: Resolution, fps: u32) -> Self {
        let lut = DepthLut::new();
        Self {
            resolution,
            wall_code: lut.code_for(WALL_DISTANCE).unwrap_or(NO_RETURN),
            box_code: lut.code_for(BOX_DISTANCE).unwrap_or(NO_RETURN),
            pacer: FramePacer::new(fps),
            max_frames: None,
            next_index: 0,
            led: LedState::Off,
        }
    }

    /// Stop after `frames` frames instead of running forever.
    pub fn with_max_frames(mut self, frames: u32) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn led(&self) -> LedState {
        self.led
    }

    pub fn frames_generated(&self) -> u32 {
        self.next_index
    }

    /// Whether frame `index` falls in the dropout part of the cycle.
    pub fn is_dropout(index: u32) -> bool {
        index % CYCLE_FRAMES >= CYCLE_FRAMES - DROPOUT_FRAMES
    }

    /// Horizontal center of the box in frame `index`.
    fn box_center(&self, index: u32) -> i64 {
        let w = self.resolution.width as f64;
        let phase = index as f64 * std::f64::consts::TAU / CYCLE_FRAMES as f64;
        (w / 2.0 + phase.sin() * w / 4.0) as i64
    }

    /// Build frame `index` of the scene.
    pub fn frame_at(&self, index: u32) -> Result<DepthFrame, SensorError> {
        let Resolution { width, height } = self.resolution;
        let sky = height / 8;
        let (box_top, box_bottom) = (height / 3, height * 2 / 3);
        let half_width = (width / 8) as i64;
        let center = self.box_center(index);
        let dropout = Self::is_dropout(index);

        let mut samples = Vec::with_capacity(self.resolution.pixel_count());
        for y in 0..height {
            for x in 0..width {
                let sample = if y < sky || (dropout && (x + y) % 4 != 0) {
                    NO_RETURN
                } else if (box_top..box_bottom).contains(&y) && (x as i64 - center).abs() <= half_width {
                    self.box_code
                } else {
                    self.wall_code
                };
                samples.push(sample);
            }
        }

        let timestamp = index.wrapping_mul(self.pacer.timestamp_step());
        Ok(DepthFrame::new(self.resolution, samples, timestamp)?)
    }
}

impl DepthSensor for SyntheticSensor {
    fn process_events(&mut self, handler: &mut dyn FrameHandler) -> Result<SensorStatus, SensorError> {
        if self.max_frames.is_some_and(|max| self.next_index >= max) {
            return Ok(SensorStatus::Ended);
        }

        let frame = self.frame_at(self.next_index)?;
        self.next_index = self.next_index.wrapping_add(1);

        self.pacer.wait();
        handler.on_depth(&frame)?;
        Ok(SensorStatus::Frame)
    }

    fn set_led(&mut self, led: LedState) -> Result<(), SensorError> {
        if led != self.led {
            log::info!("LED: {}", led);
            self.led = led;
        }
        Ok(())
    }
}
