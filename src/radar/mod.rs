//! Depth frame to occupancy grid pipeline.
//!
//! Per frame:
//!
//! 1. **Reset** - every active grid is zeroed
//! 2. **Accumulate** - valid samples are projected and binned
//! 3. **Border** - frustum edges are marked in each depth row
//! 4. **Render** - grids are painted to the terminal
//!
//! [`Radar`] owns all per-frame state and runs the steps in order.

mod accumulator;
mod border;
mod grid;
mod handler;
mod mapper;
mod projection;
mod view;

pub use accumulator::{
    accumulate, reset, FrameStats, ScanWindow, ViewStats, OUT_OF_RANGE_PERCENT,
};
pub use border::draw_border;
pub use grid::{Cell, Grid, GridSpec, GridSpecError, Phase, Side, MAX_DIVISIONS};
pub use handler::{DisplayMode, FrameSummary, Radar, RadarError, RadarSettings, GRID_TOP_ROW};
pub use mapper::{bin, depth_at, to_bin, Axis, Bin};
pub use projection::{ProjectionParams, DEFAULT_FOV_X_DEG, DEFAULT_FOV_Y_DEG};
pub use view::{RadarView, ViewKind};
