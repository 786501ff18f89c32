//! Per-frame occupancy accumulation.
//!
//! One pass over the scan window feeds every active view. Grids must be
//! reset first; accumulation is additive, so a second pass over the same
//! grid counts every sample twice.

use crate::depth::{DepthFrame, DepthLut, FrameError};

use super::grid::Phase;
use super::projection::ProjectionParams;
use super::view::RadarView;

/// Percentage of no-return samples above which a frame is out of range.
pub const OUT_OF_RANGE_PERCENT: u64 = 35;

/// Image rows considered for accumulation, `[top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub top: u32,
    pub bottom: u32,
}

impl ScanWindow {
    /// Whole frame.
    pub fn full(height: u32) -> Self {
        Self {
            top: 0,
            bottom: height,
        }
    }

    /// Window with `top` clamped to `[0, height - 1]` and the exclusive
    /// `bottom` clamped to `[0, height]`.
    pub fn clamped(top: i64, bottom: i64, height: u32) -> Self {
        let last = height.saturating_sub(1) as i64;
        Self {
            top: top.clamp(0, last) as u32,
            bottom: bottom.clamp(0, height as i64) as u32,
        }
    }

    pub fn rows(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Per-view counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewStats {
    /// Samples outside the view's clip planes
    pub filtered: u64,
    /// Samples whose bin had to be clamped to an edge
    pub clamped: u64,
}

/// Counters for one frame, recomputed every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Pixels inside the scan window
    pub scanned: u64,
    /// No-return samples inside the scan window
    pub out_of_range: u64,
    /// One entry per view, in view order
    pub views: Vec<ViewStats>,
}

impl FrameStats {
    /// Integer percentage of scanned samples with no return.
    pub fn out_of_range_percent(&self) -> u64 {
        if self.scanned == 0 {
            0
        } else {
            self.out_of_range * 100 / self.scanned
        }
    }

    /// Whether more than [`OUT_OF_RANGE_PERCENT`] of the window saw nothing.
    pub fn is_out_of_range(&self) -> bool {
        self.out_of_range_percent() > OUT_OF_RANGE_PERCENT
    }
}

/// Reset every view's grid for a new frame.
pub fn reset(views: &mut [RadarView]) {
    for view in views.iter_mut() {
        view.grid.reset();
    }
}

/// Bin every valid sample in the scan window into every view.
pub fn accumulate(
    views: &mut [RadarView],
    frame: &DepthFrame,
    lut: &DepthLut,
    params: &ProjectionParams,
    window: ScanWindow,
) -> Result<FrameStats, FrameError> {
    if frame.resolution() != params.resolution {
        return Err(FrameError::ResolutionMismatch {
            expected: params.resolution,
            actual: frame.resolution(),
        });
    }

    for view in views.iter() {
        if view.grid.phase() == Phase::Complete {
            log::warn!(
                "Accumulating into {} grid without a reset, counts will double",
                view.kind
            );
        }
    }

    let mut stats = FrameStats {
        views: vec![ViewStats::default(); views.len()],
        ..FrameStats::default()
    };

    let bottom = window.bottom.min(frame.height());
    for y in window.top..bottom {
        let Some(row) = frame.row(y) else {
            break;
        };

        for (x, &sample) in row.iter().enumerate() {
            stats.scanned += 1;

            let Some(z) = lut.resolve(sample) else {
                stats.out_of_range += 1;
                continue;
            };

            for (view, view_stats) in views.iter_mut().zip(stats.views.iter_mut()) {
                match view.add_sample(params, x as u32, y, z) {
                    Some((u, v)) => {
                        if u.clamped || v.clamped {
                            view_stats.clamped += 1;
                        }
                    }
                    None => view_stats.filtered += 1,
                }
            }
        }
    }

    for view in views.iter_mut() {
        view.grid.set_phase(Phase::Complete);
    }

    Ok(stats)
}
