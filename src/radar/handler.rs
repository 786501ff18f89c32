//! Per-frame radar processing and display.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::depth::{DepthFrame, DepthLut, FrameError, Resolution};
use crate::renderer::{Origin, Painter};

use super::accumulator::{self, FrameStats, ScanWindow};
use super::border::draw_border;
use super::grid::{GridSpec, Phase};
use super::projection::ProjectionParams;
use super::view::{RadarView, ViewKind};

/// Terminal row the first grid line is drawn on (below the status lines).
pub const GRID_TOP_ROW: u16 = 2;

/// Which grids to accumulate and show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Overhead and side view next to each other
    #[default]
    Both,
    /// Overhead view only
    #[serde(rename = "top")]
    TopDown,
    /// Side view only
    Side,
}

impl DisplayMode {
    pub fn shows(&self, kind: ViewKind) -> bool {
        matches!(
            (self, kind),
            (DisplayMode::Both, _)
                | (DisplayMode::TopDown, ViewKind::TopDown)
                | (DisplayMode::Side, ViewKind::Side)
        )
    }
}

/// Validated configuration for a [`Radar`].
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSettings {
    pub projection: ProjectionParams,
    pub window: ScanWindow,
    /// Overhead grid
    pub top: GridSpec,
    /// Side grid
    pub side: GridSpec,
    pub mode: DisplayMode,
}

impl RadarSettings {
    pub fn resolution(&self) -> Resolution {
        self.projection.resolution
    }
}

/// Faults from handling one frame.
#[derive(Debug, thiserror::Error)]
pub enum RadarError {
    #[error("Frame dropped: {0}")]
    Frame(#[from] FrameError),

    #[error("Failed to write to the terminal: {0}")]
    Io(#[from] io::Error),
}

/// What one frame produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    /// Zero-based index of the frame
    pub index: u32,
    pub timestamp: u32,
    pub window: ScanWindow,
    pub stats: FrameStats,
    /// popmax per active view
    pub popmax: Vec<(ViewKind, u32)>,
    /// Samples and border markers clamped into edge bins, all views
    pub clamped: u64,
    pub out_of_range: bool,
}

impl FrameSummary {
    fn popmax_label(&self, kind: ViewKind) -> String {
        self.popmax
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| n.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    /// The two status lines shown above the grids.
    pub fn status_lines(&self) -> [String; 2] {
        [
            format!(
                "time: {} frame: {} top: {} bottom: {}",
                self.timestamp, self.index, self.window.top, self.window.bottom
            ),
            format!(
                "xpopmax: {} ypopmax: {} out: {}%",
                self.popmax_label(ViewKind::TopDown),
                self.popmax_label(ViewKind::Side),
                self.stats.out_of_range_percent()
            ),
        ]
    }
}

/// Everything one frame handler invocation needs, owned in one place.
pub struct Radar<W: Write> {
    lut: DepthLut,
    params: ProjectionParams,
    window: ScanWindow,
    mode: DisplayMode,
    views: Vec<RadarView>,
    painter: Painter<W>,
    frame_index: u32,
    out_of_range: bool,
}

impl<W: Write> Radar<W> {
    pub fn new(settings: &RadarSettings, out: W) -> Self {
        let mut views = Vec::with_capacity(2);
        if settings.mode.shows(ViewKind::TopDown) {
            views.push(RadarView::new(ViewKind::TopDown, settings.top));
        }
        if settings.mode.shows(ViewKind::Side) {
            views.push(RadarView::new(ViewKind::Side, settings.side));
        }

        Self {
            lut: DepthLut::new(),
            params: settings.projection,
            window: settings.window,
            mode: settings.mode,
            views,
            painter: Painter::new(out),
            frame_index: 0,
            out_of_range: false,
        }
    }

    /// Whether the last completed frame was mostly out of range.
    ///
    /// Only meaningful between frames.
    pub fn out_of_range(&self) -> bool {
        self.out_of_range
    }

    /// Frames fully handled so far.
    pub fn frames_handled(&self) -> u32 {
        self.frame_index
    }

    pub fn view(&self, kind: ViewKind) -> Option<&RadarView> {
        self.views.iter().find(|v| v.kind == kind)
    }

    pub fn lut(&self) -> &DepthLut {
        &self.lut
    }

    pub fn painter(&self) -> &Painter<W> {
        &self.painter
    }

    pub fn painter_mut(&mut self) -> &mut Painter<W> {
        &mut self.painter
    }

    /// Accumulate, overlay and draw one frame.
    ///
    /// Grids are back in [`Phase::Idle`] once the frame is on screen.
    pub fn on_depth(&mut self, frame: &DepthFrame) -> Result<FrameSummary, RadarError> {
        accumulator::reset(&mut self.views);
        let stats = accumulator::accumulate(
            &mut self.views,
            frame,
            &self.lut,
            &self.params,
            self.window,
        )?;

        // popmax is final before the markers go in
        let popmax: Vec<(ViewKind, u32)> = self
            .views
            .iter()
            .map(|v| (v.kind, v.grid.popmax()))
            .collect();
        let mut clamped: u64 = stats.views.iter().map(|v| v.clamped).sum();
        for view in self.views.iter_mut() {
            clamped += draw_border(&mut view.grid);
        }
        if clamped > 0 {
            log::debug!(
                "Frame {}: {} samples or markers outside the projected extent, clamped to edge bins",
                self.frame_index,
                clamped
            );
        }

        let summary = FrameSummary {
            index: self.frame_index,
            timestamp: frame.timestamp,
            window: self.window,
            out_of_range: stats.is_out_of_range(),
            stats,
            popmax,
            clamped,
        };

        self.draw(&summary)?;
        for view in self.views.iter_mut() {
            view.grid.set_phase(Phase::Idle);
        }

        self.out_of_range = summary.out_of_range;
        self.frame_index = self.frame_index.wrapping_add(1);
        Ok(summary)
    }

    fn draw(&mut self, summary: &FrameSummary) -> io::Result<()> {
        self.painter.home()?;
        for line in summary.status_lines() {
            self.painter.status_line(&line)?;
        }

        self.painter.reset_colors()?;
        let row = Some(GRID_TOP_ROW);
        let single = self.mode != DisplayMode::Both;
        let mut next_col = None;

        for view in &self.views {
            let scale = view.grid.popmax();
            match view.kind {
                ViewKind::TopDown => {
                    self.painter
                        .render_grid(&view.grid, scale, Origin::at(None, row), false, single)?;
                    next_col = u16::try_from(view.grid.cols() + 1).ok();
                }
                ViewKind::Side => {
                    let col = if single { None } else { next_col };
                    self.painter
                        .render_grid(&view.grid, scale, Origin::at(col, row), true, true)?;
                }
            }
        }

        self.painter.finish_frame()
    }
}
