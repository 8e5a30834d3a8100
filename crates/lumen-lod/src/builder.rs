//! Construction of node visuals for a (quality mode, tier) pair.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use lumen_scene::{
    AuxMesh, AuxRole, BuildStamp, ENV_MAP_COLORS, FaceSide, Geometry, GeometryShape, LodTier,
    Material, QualityContext, QualityMode, RenderObject, ResourceArena, TextureCache, rgb_from_hex,
};

const PERFORMANCE_SCALE: f32 = 0.7;
const FAR_SCALE: f32 = 0.8;
const INNER_CORE_SCALE: f32 = 0.7;
const QUALITY_CORE_SCALE: f32 = 0.8;
const GLOW_SCALE: f32 = 1.1;
const ATMOSPHERE_SCALE: f32 = 1.3;
const RING_INNER_SCALE: f32 = 1.4;
const RING_OUTER_SCALE: f32 = 1.8;
const CLOUD_SCALE: f32 = 1.05;

/// Base opacity of the cloud overlay before pulsing.
pub(crate) const CLOUD_OPACITY: f32 = 0.4;

/// Auxiliary meshes a node carries for a mode and tier, in build order.
pub fn aux_roles(mode: QualityMode, tier: LodTier) -> &'static [AuxRole] {
    use AuxRole::*;
    match (mode, tier) {
        (_, LodTier::None) | (QualityMode::Performance, _) => &[],
        (QualityMode::Standard, LodTier::Far) => &[],
        (QualityMode::Standard, LodTier::Medium) => &[InnerCore],
        (QualityMode::Standard, LodTier::Close) => &[InnerCore, GlowShell],
        (QualityMode::Quality, LodTier::Far | LodTier::Medium) => {
            &[Atmosphere, PolarRing, CloudOverlay]
        }
        (QualityMode::Quality, LodTier::Close) => &[InnerCore, Atmosphere, PolarRing, CloudOverlay],
    }
}

fn sphere(radius: f32, segments: u32) -> Geometry {
    Geometry::build(GeometryShape::Sphere {
        radius,
        width_segments: segments,
        height_segments: segments,
    })
}

/// Builds tier meshes into a [`ResourceArena`].
#[derive(Clone, Debug)]
pub struct TierBuilder {
    /// Environment map brightness for physical materials.
    pub env_intensity: f32,
}

impl Default for TierBuilder {
    fn default() -> Self {
        Self { env_intensity: 1.0 }
    }
}

impl TierBuilder {
    /// Build `tier` for a node whose previous visuals were already released.
    ///
    /// Edges and [`LodTier::None`] are ignored.
    pub fn build(
        &self,
        object: &mut RenderObject,
        tier: LodTier,
        ctx: &QualityContext,
        resources: &mut ResourceArena,
        textures: &mut TextureCache,
    ) {
        let Some(base) = object.base_size() else {
            return;
        };
        if tier == LodTier::None {
            return;
        }

        let color = rgb_from_hex(object.color);
        let mode = ctx.mode();
        let (primary_geometry, primary_material) = match mode {
            QualityMode::Performance => {
                let r = base * PERFORMANCE_SCALE;
                let geometry = match tier {
                    LodTier::Far => Geometry::tetrahedron(r),
                    LodTier::Medium => Geometry::octahedron(r),
                    _ => Geometry::icosahedron(r),
                };
                (geometry, Material::basic(color))
            }
            QualityMode::Standard => match tier {
                LodTier::Far => (Geometry::octahedron(base * FAR_SCALE), Material::standard(color)),
                LodTier::Medium => (sphere(base * 0.9, 16), Material::standard(color).with_opacity(0.5)),
                _ => (sphere(base * 0.95, 32), Material::standard(color).with_opacity(0.6)),
            },
            QualityMode::Quality => {
                let env = textures.env_map(ENV_MAP_COLORS, self.env_intensity);
                match tier {
                    LodTier::Far => (Geometry::octahedron(base * FAR_SCALE), Material::physical(color, env)),
                    LodTier::Medium => (sphere(base * QUALITY_CORE_SCALE, 24), Material::physical(color, env)),
                    _ => (
                        sphere(base, 32),
                        Material::physical(color, env)
                            .with_transmission(0.5)
                            .with_opacity(0.7),
                    ),
                }
            }
        };

        let radius = primary_geometry.bounding_radius;
        let primary = resources.create_mesh(primary_geometry, primary_material);

        let mut aux = Vec::with_capacity(aux_roles(mode, tier).len());
        for &role in aux_roles(mode, tier) {
            let (geometry, material, rotation) = match role {
                AuxRole::InnerCore => {
                    let (scale, material) = match mode {
                        QualityMode::Quality => (
                            QUALITY_CORE_SCALE,
                            Material::physical(color, textures.env_map(ENV_MAP_COLORS, self.env_intensity))
                                .with_emissive_intensity(1.0),
                        ),
                        _ => (INNER_CORE_SCALE, Material::standard(color).with_emissive_intensity(1.0)),
                    };
                    (sphere(base * scale, 16), material, Vec3::ZERO)
                }
                AuxRole::GlowShell => (
                    sphere(base * GLOW_SCALE, 16),
                    Material::basic(color).with_opacity(0.1).with_side(FaceSide::Back),
                    Vec3::ZERO,
                ),
                AuxRole::Atmosphere => (
                    sphere(radius * ATMOSPHERE_SCALE, 24),
                    Material::standard(color).with_opacity(0.15).with_side(FaceSide::Back),
                    Vec3::ZERO,
                ),
                AuxRole::PolarRing => (
                    Geometry::build(GeometryShape::Ring {
                        inner_radius: radius * RING_INNER_SCALE,
                        outer_radius: radius * RING_OUTER_SCALE,
                        segments: 32,
                    }),
                    Material::basic(color)
                        .with_opacity(0.3)
                        .with_side(FaceSide::Double)
                        .additive(),
                    Vec3::new(FRAC_PI_2, 0.0, 0.0),
                ),
                AuxRole::CloudOverlay => {
                    let mask = textures.cloud_mask(object.color);
                    (
                        sphere(radius * CLOUD_SCALE, 24),
                        Material::standard([1.0; 3])
                            .with_alpha_map(mask)
                            .with_opacity(CLOUD_OPACITY)
                            .with_side(FaceSide::Double),
                        Vec3::ZERO,
                    )
                }
            };
            aux.push(AuxMesh {
                role,
                mesh: resources.create_mesh(geometry, material),
                rotation,
            });
        }

        object.install(
            primary,
            aux,
            tier,
            mode == QualityMode::Quality,
            BuildStamp {
                mode,
                epoch: ctx.epoch(),
            },
        );
    }
}
