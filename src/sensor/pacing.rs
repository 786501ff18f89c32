//! Frame-rate pacing for sensors that are not driven by hardware.

use std::time::{Duration, Instant};

/// Timestamp step used when frames are not paced (about 30 fps).
const UNPACED_STEP_MS: u32 = 33;

/// Sleeps until each frame is due.
#[derive(Debug)]
pub struct FramePacer {
    period: Option<Duration>,
    next_due: Option<Instant>,
}

impl FramePacer {
    /// `fps == 0` disables pacing.
    pub fn new(fps: u32) -> Self {
        let period = (fps > 0).then(|| Duration::from_secs(1) / fps);
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Milliseconds between frame timestamps.
    pub fn timestamp_step(&self) -> u32 {
        self.period
            .map(|p| p.as_millis() as u32)
            .unwrap_or(UNPACED_STEP_MS)
    }

    /// Block until the next frame is due.
    ///
    /// A late frame resets the schedule instead of bursting to catch up.
    pub fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };

        let now = Instant::now();
        match self.next_due {
            Some(due) if due > now => {
                std::thread::sleep(due - now);
                self.next_due = Some(due + period);
            }
            _ => self.next_due = Some(now + period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaced() {
        let mut pacer = FramePacer::new(0);
        assert_eq!(pacer.period(), None);
        assert_eq!(pacer.timestamp_step(), 33);
        pacer.wait();
    }

    #[test]
    fn test_period_from_rate() {
        let pacer = FramePacer::new(10);
        assert_eq!(pacer.period(), Some(Duration::from_millis(100)));
        assert_eq!(pacer.timestamp_step(), 100);
    }

    #[test]
    fn test_second_frame_waits_one_period() {
        let mut pacer = FramePacer::new(50);
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
