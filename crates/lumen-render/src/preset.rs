//! Declarative quality presets.

use lumen_scene::QualityMode;

/// Bloom post-process parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Intensity of the bloom contribution.
    pub strength: f32,
    /// Blur radius of the bloom kernel.
    pub radius: f32,
    /// Luminance threshold above which pixels bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.25,
            radius: 0.6,
            threshold: 0.85,
        }
    }
}

/// Where the render pixel ratio comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelRatio {
    /// Whatever the display reports.
    Device,
    Fixed(f32),
}

impl PixelRatio {
    pub fn resolve(self, device_ratio: f32) -> f32 {
        match self {
            Self::Device => device_ratio,
            Self::Fixed(ratio) => ratio,
        }
    }
}

/// Renderer settings bundled under a quality mode.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityPreset {
    pub mode: QualityMode,
    pub bloom: Option<BloomSettings>,
    pub ambient_occlusion: bool,
    pub shadows: bool,
    pub antialias: bool,
    pub pixel_ratio: PixelRatio,
    /// Camera far plane.
    pub render_distance: f32,
    /// Multiplier on LOD thresholds.
    pub lod_bias: f32,
}

impl QualityPreset {
    pub fn for_mode(mode: QualityMode) -> Self {
        match mode {
            QualityMode::Quality => Self {
                mode,
                bloom: Some(BloomSettings::default()),
                ambient_occlusion: true,
                shadows: true,
                antialias: true,
                pixel_ratio: PixelRatio::Device,
                render_distance: 500_000.0,
                lod_bias: 1.2,
            },
            QualityMode::Standard => Self {
                mode,
                bloom: None,
                ambient_occlusion: false,
                shadows: true,
                antialias: false,
                pixel_ratio: PixelRatio::Device,
                render_distance: 20_000.0,
                lod_bias: 1.0,
            },
            QualityMode::Performance => Self {
                mode,
                bloom: None,
                ambient_occlusion: false,
                shadows: false,
                antialias: false,
                pixel_ratio: PixelRatio::Fixed(1.0),
                render_distance: 15_000.0,
                lod_bias: 0.6,
            },
        }
    }

    /// Stars drawn in the background, and whether they use the enhanced look.
    pub fn star_density(&self) -> (u32, bool) {
        match self.mode {
            QualityMode::Quality => (20_000, true),
            QualityMode::Standard => (10_000, false),
            QualityMode::Performance => (0, false),
        }
    }
}
