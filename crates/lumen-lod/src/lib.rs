//! Per-object level of detail for graph nodes.
//!
//! Tier selection uses a hysteresis band around each threshold so objects
//! hovering near a boundary do not flicker between meshes. Tier changes
//! dispose the previous visuals before the new tier is built.

mod animation;
mod band;
mod builder;
mod engine;
mod error;
mod selector;

pub use animation::{QualityAnimator, cloud_opacity};
pub use band::DistanceBand;
pub use builder::{TierBuilder, aux_roles};
pub use engine::{LodEngine, LodPassStats};
pub use error::LodError;
pub use lumen_scene::LodTier;
pub use selector::{LodSelector, LodThresholds};
