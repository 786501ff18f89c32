use std::io::{self, BufWriter};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use kinradar::cli::{handle_config_action, Args, Command};
use kinradar::config::{default_path, Config};
use kinradar::event_loop::{self, setup_ctrlc_handler};
use kinradar::radar::{to_bin, Axis, GridSpec, Radar, RadarSettings, ViewKind};
use kinradar::sensor::{DepthSensor, ReplaySensor, SyntheticSensor};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

/// Log the derived extents and the bins the extremes land in.
fn log_geometry(settings: &RadarSettings) {
    log::info!(
        "Sensor {} scanning rows {}..{}, mode {:?}",
        settings.resolution(),
        settings.window.top,
        settings.window.bottom,
        settings.mode
    );

    let views: [(ViewKind, &GridSpec); 2] = [(ViewKind::TopDown, &settings.top), (ViewKind::Side, &settings.side)];
    for (kind, spec) in views {
        if !settings.mode.shows(kind) {
            continue;
        }
        log::info!(
            "{} grid {}x{}: {} in +/-{:.3} m, z in {}..{} m",
            kind,
            spec.udiv,
            spec.vdiv,
            kind.label(),
            spec.wmax,
            spec.zmin,
            spec.zmax
        );
        log::info!(
            "{} grid bins: -wmax -> {}, +wmax -> {}, zmin -> {}, zmax -> {}",
            kind,
            to_bin(-spec.wmax, spec, Axis::Lateral),
            to_bin(spec.wmax, spec, Axis::Lateral),
            to_bin(spec.zmin, spec, Axis::Depth),
            to_bin(spec.zmax, spec, Axis::Depth)
        );
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = args.config.clone().unwrap_or_else(default_path);
    let mut config = Config::load(Some(&config_path))?;
    args.apply_to(&mut config);

    if let Some(Command::Config { action }) = args.command {
        handle_config_action(action, &config, &config_path)?;
        return Ok(());
    }

    let settings = config.settings()?;
    log_geometry(&settings);

    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = setup_ctrlc_handler(stop.clone()) {
        log::warn!("Could not set up Ctrl+C handler: {}", e);
    }

    let mut sensor: Box<dyn DepthSensor> = match &args.replay {
        Some(path) => {
            let replay = ReplaySensor::open(path, settings.resolution(), args.looping, args.fps)?;
            match args.frames {
                Some(n) => Box::new(replay.with_max_frames(n.into())),
                None => Box::new(replay),
            }
        }
        None => {
            log::info!("No recording given, using the synthetic scene");
            let synthetic = SyntheticSensor::new(settings.resolution(), args.fps);
            match args.frames {
                Some(n) => Box::new(synthetic.with_max_frames(n)),
                None => Box::new(synthetic),
            }
        }
    };

    let mut radar = Radar::new(&settings, BufWriter::new(io::stdout()));
    radar.painter_mut().clear_screen()?;

    let result = event_loop::run(sensor.as_mut(), &mut radar, &stop);

    if let Err(e) = radar.painter_mut().restore() {
        log::warn!("Failed to restore the terminal: {}", e);
    }

    let summary = result?;
    log::info!(
        "Drew {} frames ({} dropped, {} LED changes)",
        summary.frames,
        summary.dropped,
        summary.led_changes
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
