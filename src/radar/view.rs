//! Radar views: which projection feeds a grid's lateral axis.

use std::fmt;

use super::grid::{Grid, GridSpec};
use super::mapper::{bin, Axis, Bin};
use super::projection::ProjectionParams;

/// Orientation of a radar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Overhead view: columns are horizontal offset, rows are depth
    TopDown,
    /// Side view: columns are height, rows are depth
    Side,
}

impl ViewKind {
    /// Lateral world coordinate for a pixel at depth `z`.
    ///
    /// The side view bins the downward offset so the top of the scene ends
    /// up in the first column, which becomes the first line when rendered
    /// transposed.
    #[inline]
    pub fn lateral(&self, params: &ProjectionParams, x: u32, y: u32, z: f64) -> f64 {
        match self {
            ViewKind::TopDown => params.project_x(x as i32, z),
            ViewKind::Side => -params.project_y(y as i32, z),
        }
    }

    /// Visible lateral half extent at depth `z`.
    pub fn half_extent(&self, params: &ProjectionParams, z: f64) -> f64 {
        match self {
            ViewKind::TopDown => params.half_extent_x(z),
            ViewKind::Side => params.half_extent_y(z),
        }
    }

    /// Axis label used in the status line.
    pub fn label(&self) -> &'static str {
        match self {
            ViewKind::TopDown => "x",
            ViewKind::Side => "y",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::TopDown => write!(f, "top-down"),
            ViewKind::Side => write!(f, "side"),
        }
    }
}

/// A grid together with the projection that fills it.
#[derive(Debug, Clone)]
pub struct RadarView {
    pub kind: ViewKind,
    pub grid: Grid,
}

impl RadarView {
    pub fn new(kind: ViewKind, spec: GridSpec) -> Self {
        Self {
            kind,
            grid: Grid::new(spec),
        }
    }

    /// Count one resolved sample. Returns the (lateral, depth) bins, or
    /// `None` when the depth is outside the clip planes.
    pub fn add_sample(&mut self, params: &ProjectionParams, x: u32, y: u32, z: f64) -> Option<(Bin, Bin)> {
        let spec = *self.grid.spec();
        if !spec.in_clip_range(z) {
            return None;
        }

        let u = bin(self.kind.lateral(params, x, y, z), &spec, Axis::Lateral);
        let v = bin(z, &spec, Axis::Depth);
        self.grid.increment(v.index, u.index);
        Some((u, v))
    }
}
