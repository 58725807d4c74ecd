//! Horizon viewer binary.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p horizon-app -- --mode agn` to start on the quasar.

use clap::Parser;
use horizon_app::PlatformDirs;
use horizon_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::from_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                std::process::exit(1);
            }
        },
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create {}: {e}", dirs.config_dir.display());
    }

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("Invalid command line: {e}");
        std::process::exit(2);
    }

    horizon_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        config = %dirs.config_dir.display(),
        mode = %config.scene.initial_mode,
        "Starting Horizon"
    );

    if let Err(e) = horizon_app::run(config) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
