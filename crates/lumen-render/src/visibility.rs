//! Frustum culling of nodes, edges and labels.
//!
//! Nodes get their `in_frustum` flag here; the LOD engine owns `in_range`.
//! Edges and labels are resolved afterwards from the final node visibility.
//! Nothing in this module touches geometry or materials.

use glam::Vec3;
use lumen_scene::{EntityId, EntityRegistry, ObjectShape};

use crate::frustum::Frustum;

/// Counts from the last [`VisibilityController::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityStats {
    pub nodes: usize,
    pub nodes_visible: usize,
    pub edges: usize,
    pub edges_visible: usize,
    pub labels_visible: usize,
}

/// Scale of a node label at distance `d` from the camera.
pub fn node_label_scale(d: f32) -> f32 {
    if d > 5_000.0 {
        1.0
    } else if d > 2_500.0 {
        0.1 + 5.0 * (5_000.0 - d) / 2_500.0
    } else if d > 100.0 {
        5.0 - 4.0 * (2_500.0 - d) / 2_000.0
    } else {
        1.0
    }
}

/// Scale of a relationship label at distance `d` from the camera.
pub fn relationship_label_scale(d: f32) -> f32 {
    if d > 5_000.0 {
        1.0
    } else if d > 2_500.0 {
        0.1 + 2.0 * (5_000.0 - d) / 2_500.0
    } else if d > 100.0 {
        2.0 - (2_500.0 - d) / 2_000.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityController {
    /// When off, every node counts as in-frustum and every edge is shown.
    pub dynamic: bool,
    pub labels_enabled: bool,
}

impl Default for VisibilityController {
    fn default() -> Self {
        Self {
            dynamic: true,
            labels_enabled: true,
        }
    }
}

impl VisibilityController {
    pub fn new(dynamic: bool, labels_enabled: bool) -> Self {
        Self { dynamic, labels_enabled }
    }

    /// Set each node's `in_frustum` flag. Returns how many nodes changed visibility.
    pub fn update_frustum_flags(&self, registry: &mut EntityRegistry, frustum: &Frustum) -> usize {
        let mut parts = registry.parts_mut();
        let mut changed = 0;
        for object in parts.objects.values_mut() {
            if let ObjectShape::Node { position, .. } = object.shape {
                object.in_frustum = !self.dynamic || frustum.contains_point(position);
                if object.refresh_visibility() {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Decide edge and label visibility from the current node visibility.
    pub fn resolve(&self, registry: &mut EntityRegistry, frustum: &Frustum, camera: Vec3) -> VisibilityStats {
        let mut parts = registry.parts_mut();
        let mut stats = VisibilityStats::default();

        let node_visible = |id: &EntityId| parts.objects.get(id).is_some_and(|o| o.visible());
        let decisions: Vec<(EntityId, bool)> = parts
            .objects
            .values()
            .filter_map(|object| match &object.shape {
                ObjectShape::Edge {
                    start_id,
                    end_id,
                    start,
                    end,
                } => {
                    let visible = !self.dynamic
                        || node_visible(start_id)
                        || node_visible(end_id)
                        || frustum.contains_point(*start)
                        || frustum.contains_point(*end)
                        || frustum.contains_point((*start + *end) * 0.5);
                    Some((object.id.clone(), visible))
                }
                ObjectShape::Node { .. } => None,
            })
            .collect();

        for (id, visible) in decisions {
            if let Some(edge) = parts.objects.get_mut(&id) {
                edge.set_edge_visible(visible);
            }
        }

        for object in parts.objects.values() {
            if object.is_node() {
                stats.nodes += 1;
                stats.nodes_visible += object.visible() as usize;
            } else {
                stats.edges += 1;
                stats.edges_visible += object.visible() as usize;
            }
        }

        for label in parts.labels.values_mut() {
            let owner = parts.objects.get(&label.owner).filter(|o| o.visible());
            label.visible = owner.is_some() && self.labels_enabled;
            if let Some(owner) = owner
                && label.visible
            {
                // Measured from the node or edge midpoint, not the lifted anchor.
                let d = owner.position().distance(camera);
                let scale = if label.for_relationship {
                    relationship_label_scale(d)
                } else {
                    node_label_scale(d)
                };
                label.set_scale(scale);
                stats.labels_visible += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use lumen_scene::{LABEL_BASE_WIDTH, VisualEntity};

    /// Camera at (0, 0, 1000) looking down -Z with a 5000 far plane.
    fn frustum() -> Frustum {
        let camera = Camera {
            far: 5_000.0,
            ..Camera::default()
        };
        Frustum::from_view_projection(&camera.view_projection_matrix())
    }

    fn node(id: &str, position: Vec3) -> VisualEntity {
        VisualEntity::node(id, position, vec!["Thing".into()], 0)
    }

    #[test]
    fn test_label_scale_bands() {
        assert_eq!(node_label_scale(6_000.0), 1.0);
        assert!((node_label_scale(5_000.0) - 0.1).abs() < 1e-5);
        assert!((node_label_scale(2_501.0) - 5.098).abs() < 1e-2);
        assert!((node_label_scale(2_500.0) - 5.0).abs() < 1e-5);
        assert!((node_label_scale(500.0) - 1.0).abs() < 1e-5);
        assert_eq!(node_label_scale(50.0), 1.0);

        assert!((relationship_label_scale(2_500.0) - 2.0).abs() < 1e-5);
        assert!((relationship_label_scale(500.0) - 1.0).abs() < 1e-5);
        assert!((relationship_label_scale(3_750.0) - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_nodes_outside_frustum_hidden() {
        let mut registry = EntityRegistry::new();
        registry.register(node("front", Vec3::ZERO)).unwrap();
        registry.register(node("behind", Vec3::new(0.0, 0.0, 3_000.0))).unwrap();
        let controller = VisibilityController::default();
        controller.update_frustum_flags(&mut registry, &frustum());

        assert!(registry.get(&"front".into()).unwrap().visible());
        assert!(!registry.get(&"behind".into()).unwrap().visible());
    }

    #[test]
    fn test_static_rendering_shows_everything() {
        let mut registry = EntityRegistry::new();
        registry.register(node("behind", Vec3::new(0.0, 0.0, 3_000.0))).unwrap();
        let controller = VisibilityController::new(false, true);
        controller.update_frustum_flags(&mut registry, &frustum());
        assert!(registry.get(&"behind".into()).unwrap().visible());
    }

    /// Both endpoints outside the frustum but the midpoint inside keeps the edge.
    #[test]
    fn test_edge_visible_through_midpoint() {
        let mut registry = EntityRegistry::new();
        registry.register(node("l", Vec3::new(-50_000.0, 0.0, 0.0))).unwrap();
        registry.register(node("r", Vec3::new(50_000.0, 0.0, 0.0))).unwrap();
        registry
            .register(VisualEntity::relationship("e", "LINKS", "l", "r"))
            .unwrap();
        let controller = VisibilityController::default();
        let frustum = frustum();
        controller.update_frustum_flags(&mut registry, &frustum);
        let stats = controller.resolve(&mut registry, &frustum, Vec3::new(0.0, 0.0, 1_000.0));

        assert!(!registry.get(&"l".into()).unwrap().visible());
        assert!(registry.get(&"e".into()).unwrap().visible());
        assert_eq!(stats.edges_visible, 1);
        assert_eq!(stats.nodes_visible, 0);
    }

    #[test]
    fn test_edge_hidden_when_fully_outside() {
        let mut registry = EntityRegistry::new();
        registry.register(node("a", Vec3::new(0.0, 0.0, 3_000.0))).unwrap();
        registry.register(node("b", Vec3::new(100.0, 0.0, 3_000.0))).unwrap();
        registry.register(VisualEntity::relationship("e", "", "a", "b")).unwrap();
        let controller = VisibilityController::default();
        let frustum = frustum();
        controller.update_frustum_flags(&mut registry, &frustum);
        controller.resolve(&mut registry, &frustum, Vec3::ZERO);
        assert!(!registry.get(&"e".into()).unwrap().visible());
    }

    /// Label scale follows the owner's distance even when the lifted anchor
    /// falls in another band.
    #[test]
    fn test_label_scale_measured_from_owner() {
        let mut registry = EntityRegistry::new();
        registry.register(node("n", Vec3::new(0.0, 0.0, -1_500.0))).unwrap();
        let camera = Vec3::new(0.0, 0.0, 1_000.0);
        let controller = VisibilityController::new(false, true);
        controller.update_frustum_flags(&mut registry, &frustum());
        controller.resolve(&mut registry, &frustum(), camera);

        let label = registry.label(&"n".into()).unwrap();
        assert!(label.anchor.distance(camera) > 2_500.0);
        assert!((label.size.x - 5.0 * LABEL_BASE_WIDTH).abs() < 1e-3);
    }

    #[test]
    fn test_labels_follow_owner_and_global_switch() {
        let mut registry = EntityRegistry::new();
        registry.register(node("in", Vec3::ZERO)).unwrap();
        registry.register(node("out", Vec3::new(0.0, 0.0, 3_000.0))).unwrap();
        let frustum = frustum();

        let controller = VisibilityController::default();
        controller.update_frustum_flags(&mut registry, &frustum);
        let stats = controller.resolve(&mut registry, &frustum, Vec3::new(0.0, 0.0, 1_000.0));
        assert_eq!(stats.labels_visible, 1);
        registry.for_each(|object, label| {
            if let Some(label) = label {
                assert!(!label.visible || object.visible());
            }
        });
        // Node at 1000 from the camera: scale 5 - 4 * 1500 / 2000 = 2.
        let label = registry.label(&"in".into()).unwrap();
        assert!((label.size.x - 2.0 * LABEL_BASE_WIDTH).abs() < 1e-3);

        let hidden = VisibilityController::new(true, false);
        let stats = hidden.resolve(&mut registry, &frustum, Vec3::ZERO);
        assert_eq!(stats.labels_visible, 0);
    }
}
