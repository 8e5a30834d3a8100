//! Rendering policy for the graph viewer: camera and frustum math, culling
//! of nodes, edges and labels, quality presets with their instanced
//! fallback, the adaptive performance monitor, stage profiling, and the
//! per-frame draw list.

pub mod camera;
pub mod capabilities;
pub mod draw;
pub mod error;
pub mod frustum;
pub mod instancing;
pub mod manager;
pub mod monitor;
pub mod preset;
pub mod profiler;
pub mod settings;
pub mod starfield;
pub mod visibility;

pub use camera::{Camera, CameraUniform, Ray};
pub use capabilities::{Effect, RendererCapabilities};
pub use draw::{DrawItem, DrawList, build_draw_list};
pub use error::RenderError;
pub use frustum::Frustum;
pub use instancing::{INSTANCE_SPHERE_RADIUS, InstanceData, InstancedBatch};
pub use lumen_scene::{QualityContext, QualityMode};
pub use manager::{PresetChange, QualityPresetManager};
pub use monitor::{AdaptivePerformanceMonitor, FpsCounter, MonitorConfig, MonitorEvent, PerformanceState};
pub use preset::{BloomSettings, PixelRatio, QualityPreset};
pub use profiler::{FpsRating, ProfileStage, ProfilerConfig, StageProfiler};
pub use settings::RendererSettings;
pub use starfield::{GroundLight, STAR_COLORS, Star, Starfield};
pub use visibility::{VisibilityController, VisibilityStats, node_label_scale, relationship_label_scale};
