//! Configuration structs with viewer defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Rendering and scene settings.
    pub render: RenderConfig,
    /// Level-of-detail thresholds.
    pub lod: LodConfig,
    /// Adaptive performance monitor.
    pub performance: PerformanceConfig,
    /// Free-fly camera.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Preset applied at startup: "quality", "standard" or "performance".
    pub quality_preset: String,
    /// Camera far plane in world units.
    pub render_distance: f32,
    /// Edge length of the cube the graph is laid out in.
    pub space_size: f32,
    /// Re-evaluate LOD tiers every frame.
    pub use_lod: bool,
    /// Only evaluate LOD for objects inside the view frustum.
    pub lod_visible_only: bool,
    /// Cull nodes, edges and labels against the frustum.
    pub dynamic_rendering: bool,
    /// Replace individual node meshes with one instanced batch in performance mode.
    pub simplify_meshes: bool,
    /// Pixel ratio reported by the display.
    pub device_pixel_ratio: f32,
    /// Show text labels (always hidden in performance mode).
    pub show_labels: bool,
}

/// LOD thresholds in world units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Beyond this distance an object uses the far tier.
    pub far_distance: f32,
    /// Beyond this distance (and within `far_distance`) the medium tier.
    pub medium_distance: f32,
    /// Fractional band around each threshold inside which tiers stick.
    pub hysteresis: f32,
    /// Objects farther than this are hidden.
    pub max_visible_distance: f32,
    /// `max_visible_distance` while performance mode is active.
    pub performance_max_visible_distance: f32,
}

/// Adaptive performance monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Enable automatic degrade/restore.
    pub adaptive: bool,
    /// Take one FPS sample every this many frames.
    pub sample_interval_frames: u32,
    /// Number of samples averaged.
    pub sample_window: usize,
    /// Average FPS below which performance mode is forced.
    pub low_fps: f32,
    /// Average FPS above which the user preset is restored.
    pub high_fps: f32,
    /// Render distance ceiling applied when degrading.
    pub degraded_render_distance: f32,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Base movement speed in world units per second.
    pub move_speed: f32,
    /// Speed factor while the boost key is held.
    pub boost_factor: f32,
    /// Mouse-look sensitivity.
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Default fly-to duration in milliseconds.
    pub focus_duration_ms: f32,
    /// Closest a fly-to may end relative to its look-at point.
    pub min_focus_distance: f32,
    pub speed_multiplier_min: f32,
    pub speed_multiplier_max: f32,
    pub speed_multiplier_step: f32,
    /// Seconds the speed indicator stays up after the last scroll.
    pub speed_indicator_seconds: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the FPS counter in the status line.
    pub show_fps: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Time frame stages and preset switches.
    pub profiler: bool,
}

// --- Default implementations ---

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality_preset: "standard".to_string(),
            render_distance: 20_000.0,
            space_size: 50_000.0,
            use_lod: true,
            lod_visible_only: false,
            dynamic_rendering: true,
            simplify_meshes: false,
            device_pixel_ratio: 1.0,
            show_labels: true,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            far_distance: 10_000.0,
            medium_distance: 3_000.0,
            hysteresis: 0.1,
            max_visible_distance: 50_000.0,
            performance_max_visible_distance: 15_000.0,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            adaptive: true,
            sample_interval_frames: 30,
            sample_window: 5,
            low_fps: 10.0,
            high_fps: 20.0,
            degraded_render_distance: 5_000.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 5_000.0,
            boost_factor: 4.0,
            mouse_sensitivity: 0.2,
            fov_degrees: 60.0,
            near: 1.0,
            focus_duration_ms: 1_000.0,
            min_focus_distance: 1_000.0,
            speed_multiplier_min: 0.1,
            speed_multiplier_max: 10.0,
            speed_multiplier_step: 0.1,
            speed_indicator_seconds: 2.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: true,
            log_level: "info".to_string(),
            profiler: false,
        }
    }
}

/// Platform config directory for the viewer (`<config_dir>/lumen`).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumen")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values the viewer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("expected a positive finite number, got {value}"),
                })
            }
        }

        positive("render.render_distance", self.render.render_distance)?;
        positive("render.space_size", self.render.space_size)?;
        positive("lod.far_distance", self.lod.far_distance)?;
        positive("lod.medium_distance", self.lod.medium_distance)?;
        positive("camera.move_speed", self.camera.move_speed)?;
        positive("camera.near", self.camera.near)?;

        if self.lod.medium_distance >= self.lod.far_distance {
            return Err(ConfigError::InvalidValue {
                field: "lod.medium_distance",
                reason: "must be smaller than lod.far_distance".to_string(),
            });
        }
        if !(0.0..0.5).contains(&self.lod.hysteresis) {
            return Err(ConfigError::InvalidValue {
                field: "lod.hysteresis",
                reason: format!("expected a fraction in [0, 0.5), got {}", self.lod.hysteresis),
            });
        }
        if self.performance.sample_interval_frames == 0 || self.performance.sample_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "performance",
                reason: "sample interval and window must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
