//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Mode;
use crate::config::Config;

/// Parse and validate framerate (1-120 fps)
fn parse_framerate(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !(1..=120).contains(&fps) {
        return Err(format!(
            "Framerate must be between 1 and 120 fps, got {}",
            fps
        ));
    }
    Ok(fps)
}

/// Terminal depth radar: overhead and side occupancy views of a depth sensor
#[derive(Parser, Debug)]
#[command(name = "kinradar")]
#[command(version, about = "Depth sensor radar for the terminal", long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Overhead lateral bins and side depth bins
    #[arg(short = 'g', long)]
    pub hdiv: Option<usize>,

    /// Overhead depth bins and side vertical bins
    #[arg(short = 'G', long)]
    pub vdiv: Option<usize>,

    /// First image row to scan
    #[arg(short = 'y', long)]
    pub top: Option<i64>,

    /// Image row to stop scanning at (exclusive)
    #[arg(short = 'Y', long)]
    pub bottom: Option<i64>,

    /// Near clip plane in meters
    #[arg(short = 'z', long)]
    pub near: Option<f64>,

    /// Far clip plane in meters
    #[arg(short = 'Z', long)]
    pub far: Option<f64>,

    /// Views to draw
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Horizontal half field of view in degrees
    #[arg(long)]
    pub fov_x: Option<f64>,

    /// Vertical half field of view in degrees
    #[arg(long)]
    pub fov_y: Option<f64>,

    /// Play back a raw depth recording (little-endian u16 frames)
    #[arg(long, value_name = "FILE", conflicts_with = "synthetic")]
    pub replay: Option<PathBuf>,

    /// Restart the recording when it ends
    #[arg(long = "loop", requires = "replay")]
    pub looping: bool,

    /// Use the generated test scene (default when no recording is given)
    #[arg(long)]
    pub synthetic: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u32>,

    /// Frame rate for replay and the test scene
    #[arg(long, default_value = "30", value_parser = parse_framerate)]
    pub fps: u32,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Override config values with the flags that were given.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(n) = self.hdiv {
            config.grid.top_lateral = n;
            config.grid.side_depth = n;
        }
        if let Some(n) = self.vdiv {
            config.grid.top_depth = n;
            config.grid.side_vertical = n;
        }
        if let Some(top) = self.top {
            config.scan.top = Some(top);
        }
        if let Some(bottom) = self.bottom {
            config.scan.bottom = Some(bottom);
        }
        if let Some(near) = self.near {
            config.clip.near = near;
        }
        if let Some(far) = self.far {
            config.clip.far = far;
        }
        if let Some(mode) = self.mode {
            config.display.mode = mode.into();
        }
        if let Some(fov) = self.fov_x {
            config.sensor.fov_x = fov;
        }
        if let Some(fov) = self.fov_y {
            config.sensor.fov_y = fov;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::DisplayMode;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["kinradar"]);
        assert!(args.hdiv.is_none());
        assert!(args.vdiv.is_none());
        assert!(args.mode.is_none());
        assert!(args.replay.is_none());
        assert!(!args.looping);
        assert!(!args.synthetic);
        assert_eq!(args.fps, 30);
        assert!(!args.verbose);
        assert!(args.config.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["kinradar"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_grid_flags_set_both_views() {
        let args = Args::parse_from(["kinradar", "-g", "41", "-G", "20"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.grid.top_lateral, 41);
        assert_eq!(config.grid.side_depth, 41);
        assert_eq!(config.grid.top_depth, 20);
        assert_eq!(config.grid.side_vertical, 20);
    }

    #[test]
    fn test_scan_and_clip_flags() {
        let args = Args::parse_from(["kinradar", "-y", "-10", "-Y", "300", "-z", "0.5", "-Z", "4"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.scan.top, Some(-10));
        assert_eq!(config.scan.bottom, Some(300));
        assert_eq!(config.clip.near, 0.5);
        assert_eq!(config.clip.far, 4.0);
    }

    #[test]
    fn test_mode_flag() {
        let args = Args::parse_from(["kinradar", "-m", "side"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.display.mode, DisplayMode::Side);

        let args = Args::parse_from(["kinradar", "--mode", "top"]);
        assert_eq!(args.mode, Some(Mode::Top));
    }

    #[test]
    fn test_replay_options() {
        let args = Args::parse_from(["kinradar", "--replay", "/tmp/depth.raw", "--loop", "--fps", "15"]);
        assert_eq!(args.replay, Some(PathBuf::from("/tmp/depth.raw")));
        assert!(args.looping);
        assert_eq!(args.fps, 15);
    }

    #[test]
    fn test_loop_requires_replay() {
        assert!(Args::try_parse_from(["kinradar", "--loop"]).is_err());
    }

    #[test]
    fn test_replay_conflicts_with_synthetic() {
        assert!(Args::try_parse_from(["kinradar", "--replay", "a.raw", "--synthetic"]).is_err());
    }

    #[test]
    fn test_fps_is_validated() {
        assert!(Args::try_parse_from(["kinradar", "--fps", "0"]).is_err());
        assert!(Args::try_parse_from(["kinradar", "--fps", "121"]).is_err());
        assert!(Args::try_parse_from(["kinradar", "--fps", "fast"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let args = Args::parse_from(["kinradar", "-v"]);
        assert!(args.verbose);
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["kinradar", "--config", "/tmp/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));

        let args = Args::parse_from(["kinradar", "-c", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_args_config_subcommands() {
        let args = Args::parse_from(["kinradar", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let args = Args::parse_from(["kinradar", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }
}
