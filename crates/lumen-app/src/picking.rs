//! Ray picking against drawn nodes and relationships.

use lumen_render::Ray;
use lumen_scene::{EntityId, EntityRegistry, ObjectShape, RenderObject};

/// Largest ray-to-segment distance that still hits a relationship line.
pub const PICK_LINE_THRESHOLD: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub id: EntityId,
    /// Distance along the ray.
    pub distance: f32,
}

/// Nodes drawn through the instanced batch are hidden individually but
/// still on screen.
fn drawn(object: &RenderObject) -> bool {
    object.visible() || (object.batched && object.in_frustum && object.in_range)
}

/// Nearest object hit by `ray`. Nodes are spheres of their bounding radius;
/// relationships are segments widened by `line_threshold`.
pub fn pick(registry: &EntityRegistry, ray: &Ray, line_threshold: f32) -> Option<PickHit> {
    let resources = registry.resources();
    let mut best: Option<PickHit> = None;

    registry.for_each(|object, _| {
        if !drawn(object) {
            return;
        }
        let hit = match &object.shape {
            ObjectShape::Node { position, .. } => {
                ray.intersect_sphere(*position, object.bounding_radius(resources))
            }
            ObjectShape::Edge { start, end, .. } => {
                let (t, miss) = ray.closest_to_segment(*start, *end);
                (miss <= line_threshold).then_some(t)
            }
        };
        if let Some(distance) = hit
            && best.as_ref().is_none_or(|b| distance < b.distance)
        {
            best = Some(PickHit {
                id: object.id.clone(),
                distance,
            });
        }
    });

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_scene::VisualEntity;

    fn ray_down_z(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 1_000.0),
            direction: Vec3::NEG_Z,
        }
    }

    fn registry() -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        registry
            .register(VisualEntity::node("near", Vec3::new(0.0, 0.0, 100.0), vec![], 0))
            .unwrap();
        registry
            .register(VisualEntity::node("far", Vec3::new(0.0, 0.0, -100.0), vec![], 0))
            .unwrap();
        registry
            .register(VisualEntity::node("left", Vec3::new(-500.0, 200.0, 0.0), vec![], 0))
            .unwrap();
        registry
            .register(VisualEntity::node("right", Vec3::new(500.0, 200.0, 0.0), vec![], 0))
            .unwrap();
        registry
            .register(VisualEntity::relationship("link", "KNOWS", "left", "right"))
            .unwrap();
        registry
    }

    #[test]
    fn test_nearest_node_wins() {
        let hit = pick(&registry(), &ray_down_z(0.0, 0.0), PICK_LINE_THRESHOLD).unwrap();
        assert_eq!(hit.id, EntityId::from("near"));
        // Node radius is 20 with no connections.
        assert!((hit.distance - 880.0).abs() < 1e-3);
    }

    #[test]
    fn test_relationship_within_threshold() {
        let registry = registry();
        let hit = pick(&registry, &ray_down_z(100.0, 205.0), PICK_LINE_THRESHOLD).unwrap();
        assert_eq!(hit.id, EntityId::from("link"));

        assert!(pick(&registry, &ray_down_z(100.0, 230.0), PICK_LINE_THRESHOLD).is_none());
    }

    #[test]
    fn test_hidden_objects_not_pickable() {
        let mut registry = registry();
        let near = registry.get_mut(&EntityId::from("near")).unwrap();
        near.in_frustum = false;
        near.refresh_visibility();

        let hit = pick(&registry, &ray_down_z(0.0, 0.0), PICK_LINE_THRESHOLD).unwrap();
        assert_eq!(hit.id, EntityId::from("far"));
    }
}
