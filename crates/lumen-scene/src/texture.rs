//! Procedural textures shared by every quality-mode material.
//!
//! Textures are generated once per parameter set, wrapped in `Arc`, and never
//! mutated afterwards. The cache drops its references at scene teardown;
//! materials still holding a clone keep the texels alive until they go too.

use std::sync::Arc;

use glam::Vec3;
use noise::{NoiseFn, Simplex};
use rustc_hash::FxHashMap;

use crate::palette::rgb_from_hex;

/// Gradient colors of the environment map: horizon blend pair, then zenith.
pub const ENV_MAP_COLORS: [u32; 3] = [0x0077ff, 0xff0077, 0x0000ff];

/// Edge length of one environment cubemap face.
pub const ENV_MAP_FACE_SIZE: u32 = 32;

/// Edge length of the cloud overlay mask.
pub const CLOUD_TEXTURE_SIZE: u32 = 128;

const CLOUD_NOISE_SEED: u32 = 7;
const CLOUD_OCTAVES: u32 = 4;

/// Six RGBA8 faces, ordered +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone)]
pub struct CubeTexture {
    pub face_size: u32,
    pub faces: [Vec<[u8; 4]>; 6],
}

/// Square RGBA8 texture whose alpha channel carries a cloud mask.
#[derive(Debug, Clone)]
pub struct AlphaTexture {
    pub size: u32,
    pub texels: Vec<[u8; 4]>,
}

impl AlphaTexture {
    /// Mean alpha in [0, 1].
    pub fn coverage(&self) -> f32 {
        if self.texels.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.texels.iter().map(|t| t[3] as u64).sum();
        sum as f32 / (self.texels.len() as f32 * 255.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EnvMapKey {
    colors: [u32; 3],
    intensity_bits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CloudKey {
    color: u32,
    size: u32,
}

/// Parameter-keyed store of shared textures.
#[derive(Default)]
pub struct TextureCache {
    env_maps: FxHashMap<EnvMapKey, Arc<CubeTexture>>,
    clouds: FxHashMap<CloudKey, Arc<AlphaTexture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The environment cubemap for the given gradient, generated on first use.
    pub fn env_map(&mut self, colors: [u32; 3], intensity: f32) -> Arc<CubeTexture> {
        let key = EnvMapKey {
            colors,
            intensity_bits: intensity.to_bits(),
        };
        self.env_maps
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(?colors, intensity, "generating environment map");
                Arc::new(generate_env_map(colors, intensity, ENV_MAP_FACE_SIZE))
            })
            .clone()
    }

    /// The cloud overlay mask tinted with `color`, generated on first use.
    pub fn cloud_mask(&mut self, color: u32) -> Arc<AlphaTexture> {
        let key = CloudKey {
            color,
            size: CLOUD_TEXTURE_SIZE,
        };
        self.clouds
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(color = format_args!("{color:06x}"), "generating cloud mask");
                Arc::new(generate_cloud_mask(color, CLOUD_TEXTURE_SIZE))
            })
            .clone()
    }

    /// Number of cached textures of any kind.
    pub fn len(&self) -> usize {
        self.env_maps.len() + self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.env_maps.clear();
        self.clouds.clear();
    }
}

/// Map a unit direction vector to a cube face index (0..6) and UV coordinates in [0, 1].
///
/// Face indices: 0=+X, 1=-X, 2=+Y, 3=-Y, 4=+Z, 5=-Z.
pub fn direction_to_cube_face_uv(dir: Vec3) -> (usize, f32, f32) {
    let abs = dir.abs();
    let (face, u, v) = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x > 0.0 {
            (0, -dir.z / abs.x, -dir.y / abs.x)
        } else {
            (1, dir.z / abs.x, -dir.y / abs.x)
        }
    } else if abs.y >= abs.x && abs.y >= abs.z {
        if dir.y > 0.0 {
            (2, dir.x / abs.y, dir.z / abs.y)
        } else {
            (3, dir.x / abs.y, -dir.z / abs.y)
        }
    } else if dir.z > 0.0 {
        (4, dir.x / abs.z, -dir.y / abs.z)
    } else {
        (5, -dir.x / abs.z, -dir.y / abs.z)
    };
    (face, u * 0.5 + 0.5, v * 0.5 + 0.5)
}

/// Inverse of [`direction_to_cube_face_uv`].
fn cube_face_uv_to_direction(face: usize, u: f32, v: f32) -> Vec3 {
    let a = u * 2.0 - 1.0;
    let b = v * 2.0 - 1.0;
    let dir = match face {
        0 => Vec3::new(1.0, -b, -a),
        1 => Vec3::new(-1.0, -b, a),
        2 => Vec3::new(a, 1.0, b),
        3 => Vec3::new(a, -1.0, -b),
        4 => Vec3::new(a, -b, 1.0),
        _ => Vec3::new(-a, -b, -1.0),
    };
    dir.normalize()
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Per texel: `mix(mix(c0, c1, s), c2, t)` with `s` from the direction's x and
/// `t` from its height.
fn generate_env_map(colors: [u32; 3], intensity: f32, face_size: u32) -> CubeTexture {
    let [c0, c1, c2] = colors.map(|c| Vec3::from_array(rgb_from_hex(c)) * intensity);
    let faces = std::array::from_fn(|face| {
        let mut texels = Vec::with_capacity((face_size * face_size) as usize);
        for py in 0..face_size {
            for px in 0..face_size {
                let u = (px as f32 + 0.5) / face_size as f32;
                let v = (py as f32 + 0.5) / face_size as f32;
                let dir = cube_face_uv_to_direction(face, u, v);
                let s = dir.x * 0.5 + 0.5;
                let t = dir.y * 0.5 + 0.5;
                let c = c0.lerp(c1, s).lerp(c2, t);
                texels.push([to_u8(c.x), to_u8(c.y), to_u8(c.z), 255]);
            }
        }
        texels
    });
    CubeTexture { face_size, faces }
}

/// Fractal simplex noise, soft-thresholded into wispy alpha.
fn generate_cloud_mask(color: u32, size: u32) -> AlphaTexture {
    let noise = Simplex::new(CLOUD_NOISE_SEED);
    let [r, g, b] = rgb_from_hex(color).map(to_u8);
    let base_frequency = 4.0 / size as f64;

    let mut texels = Vec::with_capacity((size * size) as usize);
    for py in 0..size {
        for px in 0..size {
            let mut total = 0.0;
            let mut frequency = base_frequency;
            let mut amplitude = 1.0;
            let mut max_amplitude = 0.0;
            for _ in 0..CLOUD_OCTAVES {
                total += noise.get([px as f64 * frequency, py as f64 * frequency]) * amplitude;
                max_amplitude += amplitude;
                frequency *= 2.0;
                amplitude *= 0.5;
            }
            let n = (total / max_amplitude) as f32 * 0.5 + 0.5;
            let alpha = ((n - 0.35) / 0.65).clamp(0.0, 1.0).powf(1.5);
            texels.push([r, g, b, to_u8(alpha)]);
        }
    }

    AlphaTexture { size, texels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_uv_roundtrip_all_faces() {
        for face in 0..6 {
            for (u, v) in [(0.25, 0.25), (0.5, 0.5), (0.8, 0.1)] {
                let dir = cube_face_uv_to_direction(face, u, v);
                let (f, u2, v2) = direction_to_cube_face_uv(dir);
                assert_eq!(f, face);
                assert!((u - u2).abs() < 1e-4 && (v - v2).abs() < 1e-4);
            }
        }
    }

    /// The zenith face is dominated by the third gradient color (blue).
    #[test]
    fn test_env_map_zenith_is_blue() {
        let mut cache = TextureCache::new();
        let env = cache.env_map(ENV_MAP_COLORS, 1.0);
        let center = (ENV_MAP_FACE_SIZE / 2 * ENV_MAP_FACE_SIZE + ENV_MAP_FACE_SIZE / 2) as usize;
        let texel = env.faces[2][center];
        assert!(texel[2] > texel[0] && texel[2] > texel[1]);
    }

    #[test]
    fn test_cache_shares_instances() {
        let mut cache = TextureCache::new();
        let a = cache.env_map(ENV_MAP_COLORS, 1.0);
        let b = cache.env_map(ENV_MAP_COLORS, 1.0);
        assert!(Arc::ptr_eq(&a, &b));
        let dimmer = cache.env_map(ENV_MAP_COLORS, 0.5);
        assert!(!Arc::ptr_eq(&a, &dimmer));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cloud_mask_keyed_by_color() {
        let mut cache = TextureCache::new();
        let magenta = cache.cloud_mask(0xff00ff);
        let again = cache.cloud_mask(0xff00ff);
        let cyan = cache.cloud_mask(0x00ffff);
        assert!(Arc::ptr_eq(&magenta, &again));
        assert!(!Arc::ptr_eq(&magenta, &cyan));
        assert_eq!(magenta.texels[0][0], 255);
        assert_eq!(cyan.texels[0][0], 0);
    }

    /// Clouds must be partial: neither empty nor a solid sheet.
    #[test]
    fn test_cloud_coverage_is_partial() {
        let mask = generate_cloud_mask(0xffffff, 64);
        let coverage = mask.coverage();
        assert!(coverage > 0.01 && coverage < 0.9, "coverage {coverage}");
    }

    #[test]
    fn test_clear_releases_entries() {
        let mut cache = TextureCache::new();
        let held = cache.cloud_mask(0x00ff00);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(Arc::strong_count(&held), 1);
    }
}
