//! Raw depth code to distance calibration.

use std::f64::consts::FRAC_PI_2;

use super::types::{MAX_VALID_CODE, NO_RETURN};

/// Number of entries in the table (every 11-bit code).
pub const LUT_SIZE: usize = 2048;

/// Scale of the tangent response curve (meters).
pub const COEFF_A: f64 = 0.1236;
/// Code divisor inside the tangent.
pub const COEFF_B: f64 = 2842.5;
/// Phase offset inside the tangent (radians).
pub const COEFF_C: f64 = 1.1863;

/// Build the raw code to distance table: `distance = A * tan(code / B + C)`.
///
/// The tangent argument crosses its pole around code 1093. Codes at or
/// past the pole saturate to the last finite distance so the table stays
/// non-decreasing; those distances are far outside any usable clip range.
pub fn build_lut() -> [f64; LUT_SIZE] {
    let mut table = [0.0; LUT_SIZE];
    let mut last = 0.0;

    for (code, slot) in table.iter_mut().enumerate() {
        let angle = code as f64 / COEFF_B + COEFF_C;
        if angle < FRAC_PI_2 {
            last = COEFF_A * angle.tan();
        }
        *slot = last;
    }

    table
}

/// Precomputed calibration table, built once at startup.
#[derive(Clone)]
pub struct DepthLut {
    table: [f64; LUT_SIZE],
}

impl DepthLut {
    pub fn new() -> Self {
        Self { table: build_lut() }
    }

    /// Distance in meters for a raw code.
    ///
    /// Callers branch on [`NO_RETURN`] first; codes above the valid range
    /// resolve to the far end of the table.
    #[inline]
    pub fn lookup(&self, code: u16) -> f64 {
        self.table[code.min(MAX_VALID_CODE) as usize]
    }

    /// Distance for a raw sample, or `None` when the sensor saw nothing.
    #[inline]
    pub fn resolve(&self, sample: u16) -> Option<f64> {
        if sample >= NO_RETURN {
            None
        } else {
            Some(self.table[sample as usize])
        }
    }

    /// Linear interpolation between neighbouring codes for a fractional index.
    ///
    /// Returns `None` outside `[0, 2046]` or for NaN.
    pub fn lookup_interp(&self, index: f64) -> Option<f64> {
        if !(0.0..=MAX_VALID_CODE as f64).contains(&index) {
            return None;
        }

        let base = index.floor();
        let t = index - base;
        let i = base as usize;
        if t == 0.0 {
            return Some(self.table[i]);
        }

        Some(self.table[i] * (1.0 - t) + self.table[i + 1] * t)
    }

    /// Smallest raw code whose distance is at least `distance`.
    ///
    /// Returns `None` for NaN or distances beyond the far end of the table.
    pub fn code_for(&self, distance: f64) -> Option<u16> {
        if distance.is_nan() {
            return None;
        }
        let valid = &self.table[..=MAX_VALID_CODE as usize];
        let code = valid.partition_point(|&d| d < distance);
        if code < valid.len() {
            Some(code as u16)
        } else {
            None
        }
    }
}

impl Default for DepthLut {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DepthLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthLut")
            .field("near", &self.table[0])
            .field("far", &self.table[MAX_VALID_CODE as usize])
            .finish()
    }
}
