//! Background decoration: a seeded star shell around the layout cube and a
//! soft light disc below it.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{RenderError, positive};

/// Star tints: white, warm white, pale blue, amber, cyan.
pub const STAR_COLORS: [u32; 5] = [0xffffff, 0xffeecc, 0xccddff, 0xffddaa, 0xaaffff];

/// One background star.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// Point size in pixels before the pixel ratio is applied.
    pub size: f32,
    pub color: [f32; 3],
}

/// A deterministic star shell between `2·S` and `3·S` from the origin.
#[derive(Clone, Debug, Default)]
pub struct Starfield {
    pub stars: Vec<Star>,
    pub enhanced: bool,
    pub space_size: f32,
}

impl Starfield {
    /// Generate `count` stars for a layout cube of edge `space_size`.
    pub fn generate(seed: u64, count: u32, space_size: f32, enhanced: bool) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut stars = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let radius = space_size * 2.0 + rng.random::<f32>() * space_size;
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (2.0 * rng.random::<f32>() - 1.0).acos();
            let position = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            );

            // Enhanced stars skew small with a few large ones.
            let size = if enhanced {
                0.3 + rng.random::<f32>().powi(2) * 3.0
            } else {
                0.5 + rng.random::<f32>() * 1.5
            };

            let base = lumen_scene::rgb_from_hex(STAR_COLORS[rng.random_range(0..STAR_COLORS.len())]);
            let color = base.map(|c| (c + rng.random::<f32>() * 0.1 - 0.05).clamp(0.0, 1.0));

            stars.push(Star {
                position,
                size,
                color,
            });
        }

        Self {
            stars,
            enhanced,
            space_size,
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Additive light disc lying flat under the layout cube.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundLight {
    pub radius: f32,
    /// Height of the disc's center.
    pub y: f32,
}

impl GroundLight {
    /// Disc of radius `(S - 5000) / 2` (never negative) at `y = -S/2`.
    pub fn for_space_size(space_size: f32) -> Result<Self, RenderError> {
        let space_size = positive("space size", space_size)?;
        Ok(Self {
            radius: ((space_size - 5_000.0) / 2.0).max(0.0),
            y: -space_size / 2.0,
        })
    }

    /// Radial falloff: full at the center, half at mid-radius, zero at the rim.
    pub fn intensity_at(&self, distance_from_center: f32) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        (1.0 - distance_from_center / self.radius).clamp(0.0, 1.0)
    }
}
