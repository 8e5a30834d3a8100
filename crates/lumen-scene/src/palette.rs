//! Label → color assignment.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

/// Colors handed out, in order, to the first distinct labels.
pub const NEON_PALETTE: [u32; 10] = [
    0xff00ff, 0x00ffff, 0xff0066, 0x00ff00, 0xff3300, 0x9900ff, 0x00ccff, 0xffff00, 0xff0000,
    0x0000ff,
];

/// Color of every relationship label.
pub const RELATIONSHIP_LABEL_COLOR: u32 = 0xffff00;

const VARIATION: f32 = 0.2;

/// Split `0xRRGGBB` into channels in [0, 1].
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

fn hex_from_rgb(rgb: [f32; 3]) -> u32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u32);
    (r << 16) | (g << 8) | b
}

/// Stable color per label for the lifetime of the scene.
#[derive(Debug, Default)]
pub struct LabelPalette {
    assigned: FxHashMap<String, u32>,
}

impl LabelPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `label`, assigning the next palette slot on first sight.
    ///
    /// Past the palette's end colors repeat with a per-slot variation, so the
    /// same scene always yields the same colors.
    pub fn color_for(&mut self, label: &str) -> u32 {
        if let Some(&color) = self.assigned.get(label) {
            return color;
        }

        let index = self.assigned.len();
        let base = NEON_PALETTE[index % NEON_PALETTE.len()];
        let color = if index < NEON_PALETTE.len() {
            base
        } else {
            let mut rng = ChaCha8Rng::seed_from_u64(index as u64);
            let varied = rgb_from_hex(base)
                .map(|c| c + (rng.random::<f32>() * 2.0 - 1.0) * VARIATION);
            hex_from_rgb(varied)
        };

        self.assigned.insert(label.to_string(), color);
        color
    }

    /// Number of distinct labels seen.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
