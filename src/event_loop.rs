//! Sensor event loop.
//!
//! Pumps frames from a [`DepthSensor`] into a [`Radar`] until the stream ends
//! or a stop is requested, and drives the status LED from the radar's
//! out-of-range flag between frames.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::radar::Radar;
use crate::sensor::{DepthSensor, LedState, SensorError, SensorStatus};

/// How a run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames drawn
    pub frames: u32,
    /// Frames dropped because they could not be decoded
    pub dropped: u32,
    /// LED changes made while running
    pub led_changes: u32,
    /// Whether the run ended on a stop request rather than end of stream
    pub stopped: bool,
}

fn led_for(out_of_range: bool) -> LedState {
    if out_of_range {
        LedState::BlinkRedYellow
    } else {
        LedState::Green
    }
}

/// Run until the sensor runs dry, `stop` is set, or the sensor fails.
///
/// The LED is switched off on every exit path that still has a working
/// sensor.
pub fn run<S, W>(sensor: &mut S, radar: &mut Radar<W>, stop: &AtomicBool) -> Result<RunSummary, SensorError>
where
    S: DepthSensor + ?Sized,
    W: Write,
{
    let mut summary = RunSummary::default();
    let mut led = LedState::Green;
    sensor.set_led(led)?;

    let result = pump(sensor, radar, stop, &mut led, &mut summary);

    if let Err(e) = sensor.set_led(LedState::Off) {
        log::warn!("Failed to switch the LED off: {}", e);
    }

    result.map(|()| {
        summary.frames = radar.frames_handled();
        summary
    })
}

fn pump<S, W>(
    sensor: &mut S,
    radar: &mut Radar<W>,
    stop: &AtomicBool,
    led: &mut LedState,
    summary: &mut RunSummary,
) -> Result<(), SensorError>
where
    S: DepthSensor + ?Sized,
    W: Write,
{
    loop {
        if stop.load(Ordering::SeqCst) {
            log::info!("Stop requested, leaving the event loop");
            summary.stopped = true;
            return Ok(());
        }

        match sensor.process_events(&mut *radar) {
            Ok(SensorStatus::Frame) | Ok(SensorStatus::Idle) => {}
            Ok(SensorStatus::Ended) => {
                log::info!("Depth stream ended after {} frames", radar.frames_handled());
                return Ok(());
            }
            Err(e) if e.is_frame_fault() => {
                log::warn!("{}", e);
                summary.dropped += 1;
            }
            Err(e) => return Err(e),
        }

        let wanted = led_for(radar.out_of_range());
        if wanted != *led {
            sensor.set_led(wanted)?;
            *led = wanted;
            summary.led_changes += 1;
        }
    }
}

/// Install a Ctrl+C / SIGTERM handler that sets `stop`.
///
/// A second signal exits immediately.
pub fn setup_ctrlc_handler(stop: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if stop.swap(true, Ordering::SeqCst) {
            eprintln!("\nReceived second interrupt, exiting");
            std::process::exit(130);
        }
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::{DepthFrame, Resolution, NO_RETURN};
    use crate::radar::{DisplayMode, GridSpec, ProjectionParams, RadarSettings, ScanWindow};
    use crate::sensor::FrameHandler;
    use std::collections::VecDeque;

    enum Step {
        Frame(DepthFrame),
        Fault(SensorError),
        Idle,
    }

    struct ScriptedSensor {
        steps: VecDeque<Step>,
        leds: Vec<LedState>,
    }

    impl ScriptedSensor {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
                leds: Vec::new(),
            }
        }
    }

    impl DepthSensor for ScriptedSensor {
        fn process_events(&mut self, handler: &mut dyn FrameHandler) -> Result<SensorStatus, SensorError> {
            match self.steps.pop_front() {
                Some(Step::Frame(frame)) => {
                    handler.on_depth(&frame)?;
                    Ok(SensorStatus::Frame)
                }
                Some(Step::Fault(e)) => Err(e),
                Some(Step::Idle) => Ok(SensorStatus::Idle),
                None => Ok(SensorStatus::Ended),
            }
        }

        fn set_led(&mut self, led: LedState) -> Result<(), SensorError> {
            self.leds.push(led);
            Ok(())
        }
    }

    fn res() -> Resolution {
        Resolution {
            width: 8,
            height: 6,
        }
    }

    fn radar() -> Radar<Vec<u8>> {
        let settings = RadarSettings {
            projection: ProjectionParams::from_degrees(res(), 35.0, 26.25),
            window: ScanWindow::full(6),
            top: GridSpec::new(9, 4, 0.0, 6.0, 4.0).unwrap(),
            side: GridSpec::new(4, 9, 0.0, 6.0, 3.0).unwrap(),
            mode: DisplayMode::Both,
        };
        Radar::new(&settings, Vec::new())
    }

    fn frame(value: u16) -> Step {
        Step::Frame(DepthFrame::filled(res(), value, 0).unwrap())
    }

    #[test]
    fn test_led_follows_out_of_range_flag() {
        let mut sensor = ScriptedSensor::new(vec![frame(700), frame(NO_RETURN), frame(NO_RETURN), frame(700)]);
        let mut radar = radar();
        let stop = AtomicBool::new(false);

        let summary = run(&mut sensor, &mut radar, &stop).unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.led_changes, 2);
        assert!(!summary.stopped);
        assert_eq!(
            sensor.leds,
            vec![
                LedState::Green,
                LedState::BlinkRedYellow,
                LedState::Green,
                LedState::Off
            ]
        );
    }

    #[test]
    fn test_frame_faults_do_not_stop_the_loop() {
        let bad = DepthFrame::filled(
            Resolution {
                width: 2,
                height: 2,
            },
            700,
            0,
        )
        .unwrap();
        let mut sensor = ScriptedSensor::new(vec![
            Step::Frame(bad),
            Step::Idle,
            Step::Fault(SensorError::Frame(crate::depth::FrameError::SizeMismatch {
                expected: 48,
                actual: 3,
            })),
            frame(700),
        ]);
        let mut radar = radar();
        let stop = AtomicBool::new(false);

        let summary = run(&mut sensor, &mut radar, &stop).unwrap();
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.frames, 1);
    }

    #[test]
    fn test_sensor_fault_ends_the_loop() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "unplugged");
        let mut sensor = ScriptedSensor::new(vec![frame(700), Step::Fault(SensorError::Io(io)), frame(700)]);
        let mut radar = radar();
        let stop = AtomicBool::new(false);

        let err = run(&mut sensor, &mut radar, &stop).unwrap_err();
        assert!(matches!(err, SensorError::Io(_)));
        assert_eq!(sensor.leds.last(), Some(&LedState::Off));
        assert_eq!(radar.frames_handled(), 1);
    }

    #[test]
    fn test_stop_flag_is_checked_before_each_frame() {
        let mut sensor = ScriptedSensor::new(vec![frame(700)]);
        let mut radar = radar();
        let stop = AtomicBool::new(true);

        let summary = run(&mut sensor, &mut radar, &stop).unwrap();
        assert!(summary.stopped);
        assert_eq!(summary.frames, 0);
        assert_eq!(sensor.leds, vec![LedState::Green, LedState::Off]);
    }
}
