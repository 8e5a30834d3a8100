//! Optional renderer effects and their availability.

use std::fmt;

use crate::error::RenderError;

/// An optional effect a preset may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    PostProcessing,
    Bloom,
    AmbientOcclusion,
    EnvironmentMap,
}

impl Effect {
    const ALL: [Effect; 4] = [
        Effect::PostProcessing,
        Effect::Bloom,
        Effect::AmbientOcclusion,
        Effect::EnvironmentMap,
    ];

    fn bit(self) -> u8 {
        1 << Self::ALL.iter().position(|e| *e == self).unwrap_or(0)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PostProcessing => "post-processing",
            Self::Bloom => "bloom",
            Self::AmbientOcclusion => "ambient occlusion",
            Self::EnvironmentMap => "environment map",
        })
    }
}

/// What the host renderer can do. Missing effects degrade, never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCapabilities {
    pub post_processing: bool,
    pub bloom: bool,
    pub ambient_occlusion: bool,
    pub environment_map: bool,
    pub(crate) warned: u8,
}

impl Default for RendererCapabilities {
    fn default() -> Self {
        Self::full()
    }
}

impl RendererCapabilities {
    /// Every effect available.
    pub fn full() -> Self {
        Self {
            post_processing: true,
            bloom: true,
            ambient_occlusion: true,
            environment_map: true,
            warned: 0,
        }
    }

    /// Plain forward rendering with no optional effects.
    pub fn basic() -> Self {
        Self {
            post_processing: false,
            bloom: false,
            ambient_occlusion: false,
            environment_map: false,
            warned: 0,
        }
    }

    /// Bloom and ambient occlusion are post passes and need post-processing.
    pub fn supports(&self, effect: Effect) -> bool {
        match effect {
            Effect::PostProcessing => self.post_processing,
            Effect::Bloom => self.post_processing && self.bloom,
            Effect::AmbientOcclusion => self.post_processing && self.ambient_occlusion,
            Effect::EnvironmentMap => self.environment_map,
        }
    }

    pub fn require(&self, effect: Effect) -> Result<(), RenderError> {
        if self.supports(effect) {
            Ok(())
        } else {
            Err(RenderError::EffectUnavailable(effect))
        }
    }

    /// Check `effect`, logging a warning the first time it is missing.
    pub fn check_and_warn(&mut self, effect: Effect, fallback: &str) -> bool {
        match self.require(effect) {
            Ok(()) => true,
            Err(err) => {
                if self.warned & effect.bit() == 0 {
                    self.warned |= effect.bit();
                    log::warn!("{err}; falling back to {fallback}");
                }
                false
            }
        }
    }

    /// Whether a warning was already logged for `effect`.
    pub fn warned(&self, effect: Effect) -> bool {
        self.warned & effect.bit() != 0
    }
}
