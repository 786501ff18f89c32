//! Subcommand handlers for config actions.

use std::path::Path;

use super::args::ConfigAction;
use crate::config::{Config, ConfigError, DEFAULT_CONFIG};

/// Handle config subcommand actions.
///
/// `config` is the effective configuration (file plus flags) and `path`
/// the file it was loaded from.
pub fn handle_config_action(action: ConfigAction, config: &Config, path: &Path) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Show => {
            if path.exists() {
                println!("# Config file: {} (exists)", path.display());
            } else {
                println!("# Config file: {} (not found, using defaults)", path.display());
            }
            println!();
            print!("{}", config.to_toml()?);

            let settings = config.settings()?;
            println!();
            println!("# Scan window: rows {}..{}", settings.window.top, settings.window.bottom);
            println!(
                "# Lateral extent at {} m: x +/-{:.3} m, y +/-{:.3} m",
                settings.top.zmax, settings.top.wmax, settings.side.wmax
            );
            Ok(())
        }
        ConfigAction::Init => {
            write_default_config(path)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

/// Write the commented default config, refusing to overwrite.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let io_err = |e: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(io_err)
}
