//! Command-line argument parsing for the Lumen viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Lumen viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "lumen-viewer", about = "Adaptive LOD graph viewer")]
pub struct CliArgs {
    /// Quality preset (quality, standard, performance).
    #[arg(long)]
    pub preset: Option<String>,

    /// Camera far plane in world units.
    #[arg(long)]
    pub render_distance: Option<f32>,

    /// Edge length of the layout cube.
    #[arg(long)]
    pub space_size: Option<f32>,

    /// Disable the adaptive performance monitor.
    #[arg(long)]
    pub no_adaptive: bool,

    /// Draw nodes as one instanced batch in performance mode.
    #[arg(long)]
    pub simplify_meshes: bool,

    /// Time frame stages and log a profiling report.
    #[arg(long)]
    pub profile: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of synthetic nodes to generate.
    #[arg(long, default_value_t = 2_000)]
    pub nodes: usize,

    /// Number of frames to simulate before exiting.
    #[arg(long, default_value_t = 600)]
    pub frames: u64,

    /// Seed for the synthetic graph.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref preset) = args.preset {
            self.render.quality_preset = preset.clone();
        }
        if let Some(rd) = args.render_distance {
            self.render.render_distance = rd;
        }
        if let Some(size) = args.space_size {
            self.render.space_size = size;
        }
        if args.no_adaptive {
            self.performance.adaptive = false;
        }
        if args.simplify_meshes {
            self.render.simplify_meshes = true;
        }
        if args.profile {
            self.debug.profiler = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            preset: Some("performance".to_string()),
            render_distance: Some(8_000.0),
            no_adaptive: true,
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.render.quality_preset, "performance");
        assert_eq!(config.render.render_distance, 8_000.0);
        assert!(!config.performance.adaptive);
        // Non-overridden fields retain defaults
        assert_eq!(config.render.space_size, 50_000.0);
        assert!(!config.render.simplify_meshes);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "lumen-viewer",
            "--preset",
            "quality",
            "--simplify-meshes",
            "--profile",
            "--nodes",
            "500",
        ]);
        assert_eq!(args.preset.as_deref(), Some("quality"));
        assert!(args.simplify_meshes);
        assert!(args.profile);
        assert_eq!(args.nodes, 500);
        assert_eq!(args.frames, 600);
    }
}
