//! Field of view edge markers.

use super::grid::{Cell, Grid, Phase, Side};
use super::mapper::{bin, depth_at, Axis};

/// Mark the left and right frustum edge in every depth row.
///
/// Each row uses the depth at its far edge, scaled against the far plane,
/// so the markers trace the cone the sensor can actually see. Markers
/// overwrite counts and leave `popmax` untouched.
///
/// Returns how many markers had to be clamped to an edge column.
pub fn draw_border(grid: &mut Grid) -> u64 {
    if grid.phase() == Phase::Accumulating {
        log::warn!("Drawing frustum border before accumulation finished");
    }

    let spec = *grid.spec();
    let step = spec.depth_step();
    let mut clamped = 0;

    for v in 0..spec.vdiv {
        let z = depth_at(&spec, v) + step;
        let half_width = spec.wmax * z / spec.zmax;

        let right = bin(half_width, &spec, Axis::Lateral);
        grid.set(v, right.index, Cell::Border(Side::Right));

        let left = bin(-half_width, &spec, Axis::Lateral);
        grid.set(v, left.index, Cell::Border(Side::Left));

        clamped += u64::from(right.clamped) + u64::from(left.clamped);
    }

    clamped
}
