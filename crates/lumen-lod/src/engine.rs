//! Per-frame LOD pass over the registry.

use glam::Vec3;
use lumen_scene::{LodTier, QualityContext, RenderObject, ResourceArena, SceneParts, TextureCache};

use crate::band::DistanceBand;
use crate::builder::TierBuilder;
use crate::selector::{LodSelector, LodThresholds};

/// Counters from one LOD pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LodPassStats {
    pub evaluated: usize,
    pub rebuilt: usize,
    pub tier_changes: usize,
    pub out_of_range: usize,
}

/// Decides and applies tiers for every node.
#[derive(Clone, Debug)]
pub struct LodEngine {
    selector: LodSelector,
    band: DistanceBand,
    builder: TierBuilder,
    enabled: bool,
    visible_only: bool,
}

impl Default for LodEngine {
    fn default() -> Self {
        Self::new(LodThresholds::default(), DistanceBand::default())
    }
}

impl LodEngine {
    pub fn new(thresholds: LodThresholds, band: DistanceBand) -> Self {
        Self {
            selector: LodSelector::new(thresholds),
            band,
            builder: TierBuilder::default(),
            enabled: true,
            visible_only: false,
        }
    }

    /// Suspend or resume tier updates. Distance culling keeps running.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Only evaluate nodes currently inside the frustum.
    pub fn set_visible_only(&mut self, visible_only: bool) {
        self.visible_only = visible_only;
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.selector.set_bias(bias);
    }

    pub fn selector(&self) -> &LodSelector {
        &self.selector
    }

    pub fn band(&self) -> &DistanceBand {
        &self.band
    }

    /// Evaluate nodes against the camera, rebuilding where the tier changed,
    /// the geometry is missing, or the visuals predate the current mode.
    pub fn evaluate(&self, parts: &mut SceneParts<'_>, ctx: &QualityContext, camera: Vec3) -> LodPassStats {
        let mut stats = LodPassStats::default();
        let resources = &mut *parts.resources;
        let textures = &mut *parts.textures;
        for object in parts.objects.values_mut() {
            if !object.is_node() || (self.visible_only && !object.in_frustum) {
                continue;
            }
            stats.evaluated += 1;
            self.evaluate_object(object, resources, textures, ctx, camera, &mut stats);
        }
        stats
    }

    /// Rebuild every node whose visuals predate `ctx`, regardless of the
    /// frustum. Nodes already current are left untouched.
    pub fn rebuild_stale(&self, parts: &mut SceneParts<'_>, ctx: &QualityContext, camera: Vec3) -> LodPassStats {
        let mut stats = LodPassStats::default();
        let resources = &mut *parts.resources;
        let textures = &mut *parts.textures;
        for object in parts.objects.values_mut() {
            if !object.is_node() {
                continue;
            }
            if object.is_stale(ctx) || object.needs_construction(resources) {
                stats.evaluated += 1;
                self.evaluate_object(object, resources, textures, ctx, camera, &mut stats);
            }
        }
        stats
    }

    fn evaluate_object(
        &self,
        object: &mut RenderObject,
        resources: &mut ResourceArena,
        textures: &mut TextureCache,
        ctx: &QualityContext,
        camera: Vec3,
        stats: &mut LodPassStats,
    ) {
        let distance = object.position().distance(camera);
        let missing = object.needs_construction(resources);
        let current = if missing { LodTier::None } else { object.current_lod() };

        object.in_range = self.band.update(object.in_range, distance, ctx.is_performance());
        let target = if self.enabled {
            self.selector.select(current, distance)
        } else if current == LodTier::None {
            self.selector.select_raw(distance)
        } else {
            current
        };

        if missing || target != current || object.is_stale(ctx) {
            if !missing && target != current {
                stats.tier_changes += 1;
                tracing::trace!(id = %object.id, from = current.name(), to = target.name(), distance, "tier change");
            }
            object.release_visuals(resources);
            self.builder.build(object, target, ctx, resources, textures);
            stats.rebuilt += 1;
        }

        if !object.in_range {
            stats.out_of_range += 1;
        }
        object.refresh_visibility();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_scene::{EntityId, EntityRegistry, QualityMode, VisualEntity};

    fn registry_with(positions: &[(&str, f32)]) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        for (id, z) in positions {
            registry
                .register(VisualEntity::node(*id, Vec3::new(0.0, 0.0, *z), vec!["T".into()], 0))
                .unwrap();
        }
        registry
    }

    fn tier(registry: &EntityRegistry, id: &str) -> LodTier {
        registry.get(&EntityId::from(id)).unwrap().current_lod()
    }

    #[test]
    fn test_first_pass_builds_everything() {
        let mut registry = registry_with(&[("near", 100.0), ("mid", 5_000.0), ("far", 20_000.0)]);
        let engine = LodEngine::default();
        let ctx = QualityContext::new(QualityMode::Standard);
        let stats = engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(stats.rebuilt, 3);
        assert_eq!(stats.tier_changes, 0);
        assert_eq!(tier(&registry, "near"), LodTier::Close);
        assert_eq!(tier(&registry, "mid"), LodTier::Medium);
        assert_eq!(tier(&registry, "far"), LodTier::Far);

        let again = engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(again.rebuilt, 0);
    }

    /// Moving back and forth across a tier boundary keeps live counts exact.
    #[test]
    fn test_tier_switches_do_not_leak() {
        let mut registry = registry_with(&[("n", 0.0)]);
        let engine = LodEngine::default();
        let ctx = QualityContext::new(QualityMode::Standard);
        for camera_z in [100.0, 5_000.0, 100.0, 12_000.0, 5_000.0, 100.0] {
            engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::new(0.0, 0.0, camera_z));
        }
        let obj = registry.get(&EntityId::from("n")).unwrap();
        assert_eq!(obj.current_lod(), LodTier::Close);
        assert_eq!(obj.aux().len(), 2);
        assert_eq!(registry.resources().counts().geometries, 3);
    }

    #[test]
    fn test_distance_band_hides_and_counts() {
        let mut registry = registry_with(&[("gone", 60_000.0)]);
        let engine = LodEngine::default();
        let ctx = QualityContext::new(QualityMode::Standard);
        let stats = engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(stats.out_of_range, 1);
        assert!(!registry.get(&EntityId::from("gone")).unwrap().visible());
    }

    #[test]
    fn test_disabled_lod_keeps_tier_but_builds_new_nodes() {
        let mut registry = registry_with(&[("n", 100.0)]);
        let mut engine = LodEngine::default();
        engine.set_enabled(false);
        let ctx = QualityContext::new(QualityMode::Standard);
        engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(tier(&registry, "n"), LodTier::Close);

        engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::new(0.0, 0.0, 30_000.0));
        assert_eq!(tier(&registry, "n"), LodTier::Close);
    }

    #[test]
    fn test_disabled_lod_still_culls_by_distance() {
        let mut registry = registry_with(&[("n", -80_000.0)]);
        let mut engine = LodEngine::default();
        engine.set_enabled(false);
        let ctx = QualityContext::new(QualityMode::Quality);
        let camera = Vec3::new(0.0, 0.0, 1_000.0);
        let stats = engine.evaluate(&mut registry.parts_mut(), &ctx, camera);
        assert_eq!(stats.out_of_range, 1);
        assert!(!registry.get(&EntityId::from("n")).unwrap().visible());

        engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::new(0.0, 0.0, -79_000.0));
        assert!(registry.get(&EntityId::from("n")).unwrap().in_range);
    }

    #[test]
    fn test_visible_only_skips_culled_nodes() {
        let mut registry = registry_with(&[("in", 100.0), ("out", 200.0)]);
        registry.get_mut(&EntityId::from("out")).unwrap().in_frustum = false;
        let mut engine = LodEngine::default();
        engine.set_visible_only(true);
        let stats = engine.evaluate(&mut registry.parts_mut(), &QualityContext::default(), Vec3::ZERO);
        assert_eq!(stats.evaluated, 1);
        assert_eq!(tier(&registry, "out"), LodTier::None);
    }

    /// Externally disposed geometry is rebuilt, not treated as an error.
    #[test]
    fn test_missing_geometry_rebuilt() {
        let mut registry = registry_with(&[("n", 100.0)]);
        let engine = LodEngine::default();
        let ctx = QualityContext::default();
        engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);

        let mesh = registry.get(&EntityId::from("n")).unwrap().primary().unwrap();
        registry.resources_mut().dispose_mesh(mesh);

        let stats = engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(stats.rebuilt, 1);
        assert!(registry.resources().is_live(registry.get(&EntityId::from("n")).unwrap().primary().unwrap()));
    }

    #[test]
    fn test_rebuild_stale_after_mode_switch() {
        let mut registry = registry_with(&[("a", 100.0), ("b", 20_000.0)]);
        let engine = LodEngine::default();
        let mut ctx = QualityContext::new(QualityMode::Standard);
        engine.evaluate(&mut registry.parts_mut(), &ctx, Vec3::ZERO);

        ctx.switch(QualityMode::Quality);
        let stats = engine.rebuild_stale(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(stats.rebuilt, 2);
        assert!(registry.get(&EntityId::from("a")).unwrap().quality_applied());

        let again = engine.rebuild_stale(&mut registry.parts_mut(), &ctx, Vec3::ZERO);
        assert_eq!(again.rebuilt, 0);
    }
}
