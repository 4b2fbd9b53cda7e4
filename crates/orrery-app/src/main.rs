//! Orrery viewer: opens a window onto an animated solar system.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --paused --textures assets/hires`.

use clap::Parser;
use orrery_app::PlatformDirs;
use orrery_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("{e}; using the working directory");
                PlatformDirs::with_config_dir(std::path::PathBuf::from("."))
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

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        "Orrery starting: {}x{}, textures from {}",
        config.window.width,
        config.window.height,
        config.assets.texture_dir.display()
    );

    if let Err(e) = orrery_app::run(config, dirs.config_dir) {
        error!("{e}");
        std::process::exit(1);
    }
}
