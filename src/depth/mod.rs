//! Depth frames and raw code calibration.
//!
//! - Frame container via [`DepthFrame`]
//! - Raw code to meters via [`DepthLut`]

mod lut;
mod types;

pub use lut::{build_lut, DepthLut, COEFF_A, COEFF_B, COEFF_C, LUT_SIZE};
pub use types::{DepthFrame, FrameError, Resolution, MAX_VALID_CODE, NO_RETURN};
