//! World coordinates to grid bins.
//!
//! Both axes scale linearly and truncate toward zero, so a bin covers a
//! half-open world interval `[lo, hi)`. The exact upper boundary (`+wmax`
//! or `zmax`) is folded into the last bin. Anything further out clamps to
//! the nearest edge bin and is reported as clamped.

use super::grid::GridSpec;

/// Grid axis a world coordinate is binned along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `[-wmax, +wmax]` onto `udiv` columns
    Lateral,
    /// `[zmin, zmax]` onto `vdiv` rows
    Depth,
}

/// A bin index and whether the coordinate fell outside the mapped range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    pub index: usize,
    pub clamped: bool,
}

/// Bin a world coordinate, reporting clamping.
pub fn bin(world: f64, spec: &GridSpec, axis: Axis) -> Bin {
    let (scaled, dim) = match axis {
        Axis::Lateral => (
            (world + spec.wmax) * spec.udiv as f64 / (2.0 * spec.wmax),
            spec.udiv,
        ),
        Axis::Depth => (
            (world - spec.zmin) * spec.vdiv as f64 / (spec.zmax - spec.zmin),
            spec.vdiv,
        ),
    };
    let last = dim - 1;

    // NaN fails both comparisons and lands in bin 0
    if !(scaled >= 0.0) {
        return Bin {
            index: 0,
            clamped: true,
        };
    }

    let truncated = scaled as usize;
    if truncated > last {
        Bin {
            index: last,
            clamped: scaled > dim as f64,
        }
    } else {
        Bin {
            index: truncated,
            clamped: false,
        }
    }
}

/// Bin a world coordinate along an axis, clamped into `[0, dim)`.
#[inline]
pub fn to_bin(world: f64, spec: &GridSpec, axis: Axis) -> usize {
    bin(world, spec, axis).index
}

/// Depth at the near edge of row `v`.
pub fn depth_at(spec: &GridSpec, v: usize) -> f64 {
    v as f64 * spec.depth_step() + spec.zmin
}
