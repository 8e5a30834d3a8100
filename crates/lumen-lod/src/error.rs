//! LOD configuration errors.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodError {
    #[error("LOD thresholds must be positive and finite (far {far}, medium {medium})")]
    NonPositiveThreshold { far: f32, medium: f32 },

    #[error("far threshold {far} must exceed medium threshold {medium}")]
    InvertedThresholds { far: f32, medium: f32 },

    #[error("hysteresis must be in [0, 0.5), got {0}")]
    Hysteresis(f32),
}
