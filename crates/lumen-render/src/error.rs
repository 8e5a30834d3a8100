//! Render policy error types.

use crate::capabilities::Effect;

/// Errors from runtime render controls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// A numeric control received NaN, infinity or a non-positive value.
    #[error("invalid value for {what}: {value}")]
    InvalidNumericInput { what: &'static str, value: f32 },

    /// An optional effect is not supported by the renderer.
    #[error("{0} is unavailable on this renderer")]
    EffectUnavailable(Effect),

    /// A preset name did not match any known preset.
    #[error("unknown quality preset `{0}`")]
    UnknownPreset(String),
}

/// Accept only finite, strictly positive values.
pub(crate) fn positive(what: &'static str, value: f32) -> Result<f32, RenderError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RenderError::InvalidNumericInput { what, value })
    }
}
