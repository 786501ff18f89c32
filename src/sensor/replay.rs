//! Playback of raw depth recordings.
//!
//! A recording is a sequence of frames, each `width * height` little-endian
//! `u16` samples with no header.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::depth::{DepthFrame, FrameError, Resolution};

use super::pacing::FramePacer;
use super::types::{DepthSensor, FrameHandler, LedState, SensorError, SensorStatus};

/// Depth sensor that reads frames from a recording.
pub struct ReplaySensor<R: Read + Seek> {
    reader: R,
    resolution: Resolution,
    looping: bool,
    pacer: FramePacer,
    buffer: Vec<u8>,
    max_frames: Option<u64>,
    frames_read: u64,
    timestamp: u32,
    led: LedState,
}

impl ReplaySensor<BufReader<File>> {
    /// Open a recording file.
    pub fn open(path: &Path, resolution: Resolution, looping: bool, fps: u32) -> Result<Self, SensorError> {
        let file = File::open(path).map_err(|e| SensorError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Replaying {} at {} ({} fps)", path.display(), resolution, fps);
        Ok(Self::new(BufReader::new(file), resolution, looping, fps))
    }
}

impl<R: Read + Seek> ReplaySensor<R> {
    /// Replay from any seekable reader. `fps == 0` delivers frames as fast as
    /// they can be read.
    pub fn new(reader: R, resolution: Resolution, looping: bool, fps: u32) -> Self {
        Self {
            reader,
            resolution,
            looping,
            pacer: FramePacer::new(fps),
            buffer: vec![0; resolution.pixel_count() * 2],
            max_frames: None,
            frames_read: 0,
            timestamp: 0,
            led: LedState::Off,
        }
    }

    /// Stop after `frames` frames, counting repeats when looping.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn led(&self) -> LedState {
        self.led
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Fill the buffer with the next frame. Returns the bytes read, which is
    /// short only at end of stream.
    fn fill(&mut self) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn next_frame(&mut self) -> Result<Option<DepthFrame>, SensorError> {
        let mut filled = self.fill()?;

        if filled == 0 && self.looping && self.frames_read > 0 {
            log::debug!("Recording ended after {} frames, rewinding", self.frames_read);
            self.reader.seek(SeekFrom::Start(0))?;
            filled = self.fill()?;
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < self.buffer.len() {
            return Err(FrameError::SizeMismatch {
                expected: self.resolution.pixel_count(),
                actual: filled / 2,
            }
            .into());
        }

        let samples: Vec<u16> = self
            .buffer
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();

        self.frames_read += 1;
        self.timestamp = self.timestamp.wrapping_add(self.pacer.timestamp_step());
        Ok(Some(DepthFrame::new(self.resolution, samples, self.timestamp)?))
    }
}

impl<R: Read + Seek> DepthSensor for ReplaySensor<R> {
    fn process_events(&mut self, handler: &mut dyn FrameHandler) -> Result<SensorStatus, SensorError> {
        if self.max_frames.is_some_and(|max| self.frames_read >= max) {
            return Ok(SensorStatus::Ended);
        }

        let Some(frame) = self.next_frame()? else {
            return Ok(SensorStatus::Ended);
        };

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

/// Write frames in the recording format.
pub fn encode_frames<'a>(frames: impl IntoIterator<Item = &'a DepthFrame>) -> Vec<u8> {
    frames
        .into_iter()
        .flat_map(|f| f.samples().iter().flat_map(|s| s.to_le_bytes()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Collect(Vec<DepthFrame>);

    impl FrameHandler for Collect {
        fn on_depth(&mut self, frame: &DepthFrame) -> Result<(), crate::radar::RadarError> {
            self.0.push(frame.clone());
            Ok(())
        }
    }

    fn res() -> Resolution {
        Resolution {
            width: 2,
            height: 2,
        }
    }

    fn recording(values: &[u16]) -> Vec<u8> {
        let frames: Vec<DepthFrame> = values
            .iter()
            .map(|&v| DepthFrame::filled(res(), v, 0).unwrap())
            .collect();
        encode_frames(&frames)
    }

    #[test]
    fn test_replays_frames_in_order() {
        let mut sensor = ReplaySensor::new(Cursor::new(recording(&[100, 200])), res(), false, 0);
        let mut sink = Collect(Vec::new());

        assert_eq!(sensor.process_events(&mut sink).unwrap(), SensorStatus::Frame);
        assert_eq!(sensor.process_events(&mut sink).unwrap(), SensorStatus::Frame);
        assert_eq!(sensor.process_events(&mut sink).unwrap(), SensorStatus::Ended);

        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[0].samples(), &[100, 100, 100, 100]);
        assert_eq!(sink.0[1].samples(), &[200, 200, 200, 200]);
        assert!(sink.0[1].timestamp > sink.0[0].timestamp);
    }

    #[test]
    fn test_looping_rewinds() {
        let mut sensor = ReplaySensor::new(Cursor::new(recording(&[7])), res(), true, 0);
        let mut sink = Collect(Vec::new());
        for _ in 0..3 {
            assert_eq!(sensor.process_events(&mut sink).unwrap(), SensorStatus::Frame);
        }
        assert_eq!(sensor.frames_read(), 3);
    }

    #[test]
    fn test_max_frames_stops_looping_replay() {
        let mut sensor = ReplaySensor::new(Cursor::new(recording(&[7, 8])), res(), true, 0).with_max_frames(5);
        let mut sink = Collect(Vec::new());
        while sensor.process_events(&mut sink).unwrap() == SensorStatus::Frame {}
        assert_eq!(sink.0.len(), 5);
        assert_eq!(sink.0[4].samples()[0], 7);
    }

    #[test]
    fn test_empty_recording_does_not_spin_when_looping() {
        let mut sensor = ReplaySensor::new(Cursor::new(Vec::new()), res(), true, 0);
        let mut sink = Collect(Vec::new());
        assert_eq!(sensor.process_events(&mut sink).unwrap(), SensorStatus::Ended);
    }

    #[test]
    fn test_truncated_frame_is_a_frame_fault() {
        let mut bytes = recording(&[5]);
        bytes.extend_from_slice(&[1, 0, 2]);
        let mut sensor = ReplaySensor::new(Cursor::new(bytes), res(), false, 0);
        let mut sink = Collect(Vec::new());

        assert_eq!(sensor.process_events(&mut sink).unwrap(), SensorStatus::Frame);
        let err = sensor.process_events(&mut sink).unwrap_err();
        assert!(err.is_frame_fault());
        assert!(matches!(
            err,
            SensorError::Frame(FrameError::SizeMismatch {
                expected: 4,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_wide_sample_is_rejected() {
        let bytes = vec![0xff, 0x0f, 0, 0, 0, 0, 0, 0];
        let mut sensor = ReplaySensor::new(Cursor::new(bytes), res(), false, 0);
        let mut sink = Collect(Vec::new());
        let err = sensor.process_events(&mut sink).unwrap_err();
        assert!(matches!(
            err,
            SensorError::Frame(FrameError::SampleOutOfRange { index: 0, value: 4095 })
        ));
    }

    #[test]
    fn test_led_changes_are_tracked() {
        let mut sensor = ReplaySensor::new(Cursor::new(Vec::new()), res(), false, 0);
        assert_eq!(sensor.led(), LedState::Off);
        sensor.set_led(LedState::Green).unwrap();
        assert_eq!(sensor.led(), LedState::Green);
    }
}
