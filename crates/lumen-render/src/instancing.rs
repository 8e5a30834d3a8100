//! Single instanced draw replacing every node mesh in simplified performance mode.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lumen_scene::{EntityId, EntityRegistry, Geometry, GeometryShape, Material, Mesh, rgb_from_hex};

/// Radius of the shared instance sphere.
pub const INSTANCE_SPHERE_RADIUS: f32 = 30.0;

/// Per-instance data: model transform and RGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// One low-poly sphere mesh drawn once per node.
#[derive(Debug)]
pub struct InstancedBatch {
    mesh: Mesh,
    instances: Vec<InstanceData>,
    members: Vec<EntityId>,
}

impl InstancedBatch {
    /// Snapshot every node into a batch and hide the individual node meshes.
    pub fn build(registry: &mut EntityRegistry) -> Self {
        let mut instances = Vec::with_capacity(registry.node_count());
        let mut members = Vec::with_capacity(registry.node_count());
        for node in registry.nodes() {
            let [r, g, b] = rgb_from_hex(node.color);
            instances.push(InstanceData {
                model: Mat4::from_translation(node.position()).to_cols_array_2d(),
                color: [r, g, b, 1.0],
            });
            members.push(node.id.clone());
        }

        for id in &members {
            if let Some(node) = registry.get_mut(id) {
                node.batched = true;
                node.refresh_visibility();
            }
        }

        let mesh = registry.resources_mut().create_mesh(
            Geometry::build(GeometryShape::Sphere {
                radius: INSTANCE_SPHERE_RADIUS,
                width_segments: 8,
                height_segments: 6,
            }),
            Material::standard([1.0; 3]),
        );

        log::info!("Built instanced batch with {} nodes", instances.len());
        Self {
            mesh,
            instances,
            members,
        }
    }

    /// Release the shared mesh and make the member nodes drawable again.
    pub fn dispose(self, registry: &mut EntityRegistry) {
        registry.resources_mut().dispose_mesh(self.mesh);
        for id in &self.members {
            if let Some(node) = registry.get_mut(id) {
                node.batched = false;
                node.refresh_visibility();
            }
        }
        log::info!("Disposed instanced batch of {} nodes", self.members.len());
    }

    pub fn mesh(&self) -> Mesh {
        self.mesh
    }

    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance data as raw bytes for an instance buffer.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_scene::VisualEntity;

    fn registry(n: usize) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        for i in 0..n {
            registry
                .register(VisualEntity::node(format!("n{i}"), Vec3::new(i as f32, 0.0, 0.0), vec!["A".into()], 0))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_build_hides_nodes_and_records_transforms() {
        let mut registry = registry(3);
        let batch = InstancedBatch::build(&mut registry);
        assert_eq!(batch.len(), 3);
        assert!(registry.nodes().all(|n| n.batched && !n.visible()));
        let translation = batch.instances()[2].model[3];
        assert_eq!(translation, [2.0, 0.0, 0.0, 1.0]);
        assert_eq!(batch.instances()[0].color, [1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_dispose_restores_nodes_and_frees_mesh() {
        let mut registry = registry(2);
        let batch = InstancedBatch::build(&mut registry);
        assert_eq!(registry.resources().counts().geometries, 1);
        batch.dispose(&mut registry);
        assert_eq!(registry.resources().counts().total(), 0);
        assert!(registry.nodes().all(|n| !n.batched && n.visible()));
    }

    #[test]
    fn test_instance_stride() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
        let mut registry = registry(4);
        let batch = InstancedBatch::build(&mut registry);
        assert_eq!(batch.instance_bytes().len(), 4 * 80);
    }
}
