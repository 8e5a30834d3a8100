//! Ring spin and cloud drift on quality-mode nodes.

use lumen_scene::{AuxRole, QualityContext, QualityMode, RenderObject, ResourceArena};

use crate::builder::CLOUD_OPACITY;

/// Animation clock advance per frame.
const TIME_STEP: f32 = 0.01;

/// Cloud overlay opacity at animation time `t`.
pub fn cloud_opacity(t: f32) -> f32 {
    CLOUD_OPACITY * (0.7 + (t * 0.3).sin() * 0.1)
}

/// Drives decoration animation while quality mode is active.
#[derive(Clone, Debug)]
pub struct QualityAnimator {
    time: f32,
    enabled: bool,
}

impl Default for QualityAnimator {
    fn default() -> Self {
        Self {
            time: 0.0,
            enabled: true,
        }
    }
}

impl QualityAnimator {
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance one frame. Returns whether anything should animate.
    pub fn tick(&mut self, ctx: &QualityContext) -> bool {
        if !self.enabled || ctx.mode() != QualityMode::Quality {
            return false;
        }
        self.time += TIME_STEP;
        true
    }

    /// Write the current animation pose into `object`'s rings and clouds.
    pub fn apply(&self, object: &mut RenderObject, resources: &mut ResourceArena) {
        if !object.quality_applied() {
            return;
        }
        let t = self.time;
        for aux in object.aux_mut() {
            match aux.role {
                AuxRole::PolarRing => aux.rotation.z = t * 0.2,
                AuxRole::CloudOverlay => {
                    aux.rotation.y = t * 0.05;
                    if let Some(material) = resources.material_mut(aux.mesh.material) {
                        material.opacity = cloud_opacity(t);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TierBuilder;
    use glam::Vec3;
    use lumen_scene::{EntityId, LodTier, TextureCache};

    #[test]
    fn test_tick_only_in_quality_mode() {
        let mut animator = QualityAnimator::default();
        assert!(!animator.tick(&QualityContext::new(QualityMode::Standard)));
        assert_eq!(animator.time(), 0.0);
        assert!(animator.tick(&QualityContext::new(QualityMode::Quality)));
        assert!((animator.time() - 0.01).abs() < 1e-6);

        animator.set_enabled(false);
        assert!(!animator.tick(&QualityContext::new(QualityMode::Quality)));
    }

    #[test]
    fn test_cloud_opacity_pulses_around_base() {
        assert!((cloud_opacity(0.0) - 0.28).abs() < 1e-6);
        for i in 0..100 {
            let o = cloud_opacity(i as f32);
            assert!((0.24..=0.32).contains(&o));
        }
    }

    #[test]
    fn test_apply_rotates_ring_and_cloud() {
        let ctx = QualityContext::new(QualityMode::Quality);
        let mut obj = RenderObject::new_node(EntityId::from("n"), Vec3::ZERO, 0, 0xff00ff);
        let mut resources = ResourceArena::new();
        TierBuilder::default().build(&mut obj, LodTier::Far, &ctx, &mut resources, &mut TextureCache::new());

        let mut animator = QualityAnimator::default();
        for _ in 0..100 {
            animator.tick(&ctx);
        }
        animator.apply(&mut obj, &mut resources);

        let ring = obj.aux().iter().find(|a| a.role == AuxRole::PolarRing).unwrap();
        assert!((ring.rotation.z - animator.time() * 0.2).abs() < 1e-5);
        let cloud = obj.aux().iter().find(|a| a.role == AuxRole::CloudOverlay).unwrap();
        assert!((cloud.rotation.y - animator.time() * 0.05).abs() < 1e-5);
        let opacity = resources.material(cloud.mesh.material).unwrap().opacity;
        assert!((opacity - cloud_opacity(animator.time())).abs() < 1e-6);
    }
}
