//! Configuration for the Lumen graph viewer.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line via clap, and reload with change detection. Every section falls back
//! to its defaults when missing, so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, LodConfig, PerformanceConfig, RenderConfig,
    default_config_dir,
};
pub use error::ConfigError;
