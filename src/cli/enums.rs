//! CLI enum types.

use clap::ValueEnum;

use crate::radar::DisplayMode;

/// Which views to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Overhead and side view next to each other
    #[default]
    Both,
    /// Overhead view only
    Top,
    /// Side view only
    Side,
}

impl From<Mode> for DisplayMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Both => DisplayMode::Both,
            Mode::Top => DisplayMode::TopDown,
            Mode::Side => DisplayMode::Side,
        }
    }
}
