//! Global renderer state derived from the active preset.

use crate::capabilities::{Effect, RendererCapabilities};
use crate::error::{RenderError, positive};
use crate::preset::{BloomSettings, QualityPreset};

/// Fog ends at this fraction of the render distance.
const FOG_FRACTION: f32 = 0.9;

/// Settings the host renderer is configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    pub shadows: bool,
    pub antialias: bool,
    pub pixel_ratio: f32,
    /// Camera far plane.
    pub render_distance: f32,
    pub fog_far: f32,
    /// Active bloom pass, if any.
    pub bloom: Option<BloomSettings>,
    pub ambient_occlusion: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shadows: true,
            antialias: false,
            pixel_ratio: 1.0,
            render_distance: 20_000.0,
            fog_far: 20_000.0 * FOG_FRACTION,
            bloom: None,
            ambient_occlusion: false,
        }
    }
}

impl RendererSettings {
    /// Take everything from `preset`, dropping effects the renderer lacks.
    pub fn apply_preset(&mut self, preset: &QualityPreset, device_pixel_ratio: f32, caps: &mut RendererCapabilities) {
        self.shadows = preset.shadows;
        self.antialias = preset.antialias;
        self.pixel_ratio = preset.pixel_ratio.resolve(device_pixel_ratio);
        self.bloom = preset
            .bloom
            .filter(|_| caps.check_and_warn(Effect::Bloom, "rendering without bloom"));
        self.ambient_occlusion = preset.ambient_occlusion
            && caps.check_and_warn(Effect::AmbientOcclusion, "rendering without ambient occlusion");
        self.set_distance(preset.render_distance);
    }

    /// Set camera far plane and fog. Rejects NaN, infinities and values ≤ 0.
    pub fn set_render_distance(&mut self, distance: f32) -> Result<(), RenderError> {
        let distance = positive("render distance", distance)?;
        self.set_distance(distance);
        log::info!("Render distance set to {distance}");
        Ok(())
    }

    /// Lower the render distance to at most `ceiling`.
    pub fn clamp_render_distance(&mut self, ceiling: f32) {
        if ceiling.is_finite() && ceiling > 0.0 && ceiling < self.render_distance {
            self.set_distance(ceiling);
        }
    }

    fn set_distance(&mut self, distance: f32) {
        self.render_distance = distance;
        self.fog_far = distance * FOG_FRACTION;
    }
}
