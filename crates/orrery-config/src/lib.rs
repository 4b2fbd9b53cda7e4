//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as `config.ron`, every section falls back to its
//! defaults when missing, and command-line flags override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, CameraConfig, Config, DebugConfig, RenderConfig, SimulationConfig, WindowConfig,
};
pub use error::ConfigError;
