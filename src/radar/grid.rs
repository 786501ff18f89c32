//! Occupancy grid storage.
//!
//! A grid is `vdiv` depth rows by `udiv` lateral columns, stored in one
//! contiguous buffer. Cells hold either a population count or a frustum
//! border marker written by the overlay pass.

/// Which edge of the field of view a border marker traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One grid bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Number of depth samples that landed in the bin
    Count(u32),
    /// Field of view edge marker
    Border(Side),
}

impl Cell {
    pub const EMPTY: Cell = Cell::Count(0);

    /// Population, if this is not a border marker.
    pub fn count(&self) -> Option<u32> {
        match self {
            Cell::Count(n) => Some(*n),
            Cell::Border(_) => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::EMPTY
    }
}

/// Most bins allowed along either axis. Every bin is drawn as one terminal
/// cell, so anything larger cannot be shown anyway.
pub const MAX_DIVISIONS: usize = 4096;

/// Grid geometry: bin counts, clip planes and lateral half extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Lateral divisions (columns)
    pub udiv: usize,
    /// Depth divisions (rows)
    pub vdiv: usize,
    /// Near clip plane (meters)
    pub zmin: f64,
    /// Far clip plane (meters)
    pub zmax: f64,
    /// Lateral half extent visible at the far plane (meters)
    pub wmax: f64,
}

impl GridSpec {
    /// Validated grid geometry.
    pub fn new(udiv: usize, vdiv: usize, zmin: f64, zmax: f64, wmax: f64) -> Result<Self, GridSpecError> {
        if udiv == 0 || vdiv == 0 {
            return Err(GridSpecError::ZeroDivisions { udiv, vdiv });
        }
        if udiv > MAX_DIVISIONS || vdiv > MAX_DIVISIONS || udiv.checked_mul(vdiv).is_none() {
            return Err(GridSpecError::TooLarge { udiv, vdiv });
        }
        if !zmin.is_finite() || !zmax.is_finite() || zmin < 0.0 || zmax <= zmin {
            return Err(GridSpecError::ClipRange { zmin, zmax });
        }
        if !wmax.is_finite() || wmax <= 0.0 {
            return Err(GridSpecError::Extent(wmax));
        }

        Ok(Self {
            udiv,
            vdiv,
            zmin,
            zmax,
            wmax,
        })
    }

    /// Depth covered by one row (meters).
    pub fn depth_step(&self) -> f64 {
        (self.zmax - self.zmin) / self.vdiv as f64
    }

    /// Whether a depth lies inside the clip planes (inclusive).
    #[inline]
    pub fn in_clip_range(&self, z: f64) -> bool {
        z >= self.zmin && z <= self.zmax
    }
}

/// Invalid grid geometry.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GridSpecError {
    #[error("Grid divisions must be positive, got {udiv}x{vdiv}")]
    ZeroDivisions { udiv: usize, vdiv: usize },

    #[error("Grid divisions must be at most {} per axis, got {udiv}x{vdiv}", MAX_DIVISIONS)]
    TooLarge { udiv: usize, vdiv: usize },

    #[error("Clip planes must satisfy 0 <= near < far, got near={zmin} far={zmax}")]
    ClipRange { zmin: f64, zmax: f64 },

    #[error("Lateral extent must be positive and finite, got {0}")]
    Extent(f64),
}

/// Per-frame lifecycle of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Never used, or between frames once drawn
    #[default]
    Idle,
    /// Reset and receiving samples
    Accumulating,
    /// Samples counted, popmax final
    Complete,
}

/// Dense occupancy grid with its running maximum.
#[derive(Debug, Clone)]
pub struct Grid {
    spec: GridSpec,
    cells: Vec<Cell>,
    popmax: u32,
    phase: Phase,
}

impl Grid {
    pub fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            cells: vec![Cell::EMPTY; spec.udiv * spec.vdiv],
            popmax: 0,
            phase: Phase::Idle,
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Number of depth rows.
    pub fn rows(&self) -> usize {
        self.spec.vdiv
    }

    /// Number of lateral columns.
    pub fn cols(&self) -> usize {
        self.spec.udiv
    }

    /// Largest population seen since the last reset. Border markers never count.
    pub fn popmax(&self) -> u32 {
        self.popmax
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Zero every cell and the running maximum.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::EMPTY);
        self.popmax = 0;
        self.phase = Phase::Accumulating;
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.spec.vdiv && col < self.spec.udiv {
            Some(row * self.spec.udiv + col)
        } else {
            None
        }
    }

    /// Cell at depth row `row`, lateral column `col`.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Overwrite a cell. Returns false when out of bounds.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Add one sample to a bin and raise popmax if exceeded.
    ///
    /// A border marker in the bin is replaced by a count of one.
    pub fn increment(&mut self, row: usize, col: usize) -> Option<u32> {
        let i = self.index(row, col)?;
        let count = match self.cells[i] {
            Cell::Count(n) => n.saturating_add(1),
            Cell::Border(_) => 1,
        };
        self.cells[i] = Cell::Count(count);
        if count > self.popmax {
            self.popmax = count;
        }
        Some(count)
    }

    /// One depth row, left to right.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.spec.vdiv {
            return None;
        }
        let start = row * self.spec.udiv;
        Some(&self.cells[start..start + self.spec.udiv])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Maximum population recomputed from the cells, skipping markers.
    pub fn scan_popmax(&self) -> u32 {
        self.cells.iter().filter_map(Cell::count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(udiv: usize, vdiv: usize) -> GridSpec {
        GridSpec::new(udiv, vdiv, 0.0, 6.0, 4.2).unwrap()
    }

    #[test]
    fn test_spec_rejects_oversized_grids() {
        assert_eq!(
            GridSpec::new(MAX_DIVISIONS + 1, 4, 0.0, 1.0, 1.0),
            Err(GridSpecError::TooLarge {
                udiv: MAX_DIVISIONS + 1,
                vdiv: 4
            })
        );
        assert!(matches!(
            GridSpec::new(usize::MAX, usize::MAX, 0.0, 1.0, 1.0),
            Err(GridSpecError::TooLarge { .. })
        ));
        assert!(GridSpec::new(MAX_DIVISIONS, 1, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_spec_rejects_zero_divisions() {
        assert_eq!(
            GridSpec::new(0, 4, 0.0, 1.0, 1.0),
            Err(GridSpecError::ZeroDivisions { udiv: 0, vdiv: 4 })
        );
    }

    #[test]
    fn test_spec_rejects_inverted_clip() {
        assert!(matches!(
            GridSpec::new(4, 4, 2.0, 1.0, 1.0),
            Err(GridSpecError::ClipRange { .. })
        ));
        assert!(matches!(
            GridSpec::new(4, 4, 1.0, 1.0, 1.0),
            Err(GridSpecError::ClipRange { .. })
        ));
    }

    #[test]
    fn test_spec_rejects_bad_extent() {
        assert_eq!(
            GridSpec::new(4, 4, 0.0, 1.0, 0.0),
            Err(GridSpecError::Extent(0.0))
        );
        assert!(GridSpec::new(4, 4, 0.0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(spec(5, 3));
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.cells().len(), 15);
        assert!(grid.cells().iter().all(|c| *c == Cell::EMPTY));
        assert_eq!(grid.phase(), Phase::Idle);
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut grid = Grid::new(spec(5, 3));
        assert!(grid.get(3, 0).is_none());
        assert!(grid.get(0, 5).is_none());
        assert!(!grid.set(3, 0, Cell::Border(Side::Left)));
        assert!(grid.increment(0, 5).is_none());
        assert!(grid.set(2, 4, Cell::Border(Side::Right)));
        assert_eq!(grid.get(2, 4), Some(Cell::Border(Side::Right)));
        assert_eq!(grid.row(2).unwrap()[4], Cell::Border(Side::Right));
    }

    #[test]
    fn test_increment_tracks_popmax() {
        let mut grid = Grid::new(spec(4, 4));
        grid.increment(1, 1);
        grid.increment(1, 1);
        grid.increment(2, 3);
        assert_eq!(grid.get(1, 1), Some(Cell::Count(2)));
        assert_eq!(grid.popmax(), 2);
        assert_eq!(grid.scan_popmax(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut grid = Grid::new(spec(4, 4));
        grid.increment(0, 0);
        grid.set(3, 3, Cell::Border(Side::Left));
        grid.reset();
        assert_eq!(grid.popmax(), 0);
        assert!(grid.cells().iter().all(|c| *c == Cell::EMPTY));
        assert_eq!(grid.phase(), Phase::Accumulating);
        assert_eq!(grid.cols(), 4);
    }

    #[test]
    fn test_scan_popmax_skips_borders() {
        let mut grid = Grid::new(spec(2, 1));
        grid.set(0, 0, Cell::Border(Side::Left));
        grid.set(0, 1, Cell::Border(Side::Right));
        assert_eq!(grid.scan_popmax(), 0);
    }
}
