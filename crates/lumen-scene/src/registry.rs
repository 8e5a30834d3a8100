//! The entity registry: id → render object and label, plus owned resources.

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::entity::{EntityId, EntityKind, VisualEntity};
use crate::error::SceneError;
use crate::geometry::{Geometry, GeometryShape};
use crate::label::LabelObject;
use crate::material::Material;
use crate::object::{ObjectShape, RenderObject};
use crate::palette::{LabelPalette, RELATIONSHIP_LABEL_COLOR, rgb_from_hex};
use crate::resources::{ResourceArena, ResourceCounts};
use crate::texture::TextureCache;

const EDGE_COLOR: u32 = 0xffffff;
const EDGE_OPACITY: f32 = 0.2;

/// Disjoint mutable views into the registry, for passes that edit objects
/// while creating or disposing resources.
pub struct SceneParts<'a> {
    pub objects: &'a mut FxHashMap<EntityId, RenderObject>,
    pub labels: &'a mut FxHashMap<EntityId, LabelObject>,
    pub resources: &'a mut ResourceArena,
    pub textures: &'a mut TextureCache,
}

/// Owns every visual entity and what it renders with.
#[derive(Default)]
pub struct EntityRegistry {
    entities: FxHashMap<EntityId, VisualEntity>,
    objects: FxHashMap<EntityId, RenderObject>,
    labels: FxHashMap<EntityId, LabelObject>,
    /// Registration order, for deterministic iteration.
    order: Vec<EntityId>,
    resources: ResourceArena,
    palette: LabelPalette,
    textures: TextureCache,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entity`, replacing and disposing any object already under its id.
    ///
    /// Nodes are registered without geometry; the LOD engine builds it on the
    /// next evaluation. Relationships get their line immediately and fail
    /// with [`SceneError::DanglingReference`] if an endpoint is unknown.
    /// Replacing a node rebuilds the relationships attached to it.
    pub fn register(&mut self, entity: VisualEntity) -> Result<&RenderObject, SceneError> {
        let id = entity.id.clone();
        let is_node = matches!(entity.kind, EntityKind::Node { .. });

        let (object, label) = match &entity.kind {
            EntityKind::Node { position } => {
                let color = self.palette.color_for(entity.primary_label().unwrap_or_default());
                let object = RenderObject::new_node(id.clone(), *position, entity.connections, color);
                let base_size = object.base_size().unwrap_or_default();
                let label = LabelObject::for_node(id.clone(), entity.primary_label(), color, *position, base_size);
                (object, label)
            }
            EntityKind::Relationship { start_id, end_id } => {
                let start = self.node_position(&id, start_id)?;
                let end = self.node_position(&id, end_id)?;
                let mut object =
                    RenderObject::new_edge(id.clone(), start_id.clone(), end_id.clone(), start, end);
                let line = self.resources.create_mesh(
                    Geometry::build(GeometryShape::Line { start, end }),
                    Material::line(rgb_from_hex(EDGE_COLOR), EDGE_OPACITY),
                );
                object.attach_line(line);
                let label = LabelObject::for_relationship(
                    id.clone(),
                    entity.primary_label(),
                    RELATIONSHIP_LABEL_COLOR,
                    start,
                    end,
                );
                (object, label)
            }
        };

        let replaced = match self.objects.remove(&id) {
            Some(mut previous) => {
                let released = previous.release_visuals(&mut self.resources);
                tracing::debug!(%id, released, "replaced existing entity");
                true
            }
            None => {
                self.order.push(id.clone());
                false
            }
        };

        self.labels.insert(id.clone(), label);
        self.entities.insert(id.clone(), entity);
        self.objects.insert(id.clone(), object);
        if replaced && is_node {
            self.rebuild_incident_edges(&id);
        }
        self.require(&id)
    }

    fn rebuild_incident_edges(&mut self, node: &EntityId) {
        let incident: Vec<VisualEntity> = self
            .entities
            .values()
            .filter(|e| {
                matches!(&e.kind, EntityKind::Relationship { start_id, end_id }
                    if start_id == node || end_id == node)
            })
            .cloned()
            .collect();
        for edge in incident {
            let edge_id = edge.id.clone();
            if let Err(e) = self.register(edge) {
                tracing::warn!(%edge_id, "relationship not rebuilt: {e}");
            }
        }
    }

    fn node_position(&self, relationship: &EntityId, endpoint: &EntityId) -> Result<Vec3, SceneError> {
        match self.objects.get(endpoint).map(|o| &o.shape) {
            Some(ObjectShape::Node { position, .. }) => Ok(*position),
            Some(ObjectShape::Edge { .. }) => Err(SceneError::EndpointNotANode {
                relationship: relationship.clone(),
                endpoint: endpoint.clone(),
            }),
            None => Err(SceneError::DanglingReference {
                relationship: relationship.clone(),
                missing: endpoint.clone(),
            }),
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&RenderObject> {
        self.objects.get(id)
    }

    /// Like [`EntityRegistry::get`], but an unknown id is an error.
    pub fn require(&self, id: &EntityId) -> Result<&RenderObject, SceneError> {
        self.objects
            .get(id)
            .ok_or_else(|| SceneError::UnknownEntity(id.clone()))
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut RenderObject> {
        self.objects.get_mut(id)
    }

    pub fn entity(&self, id: &EntityId) -> Option<&VisualEntity> {
        self.entities.get(id)
    }

    pub fn label(&self, id: &EntityId) -> Option<&LabelObject> {
        self.labels.get(id)
    }

    /// Visit every object with its label, in registration order.
    pub fn for_each(&self, mut visitor: impl FnMut(&RenderObject, Option<&LabelObject>)) {
        for id in &self.order {
            if let Some(object) = self.objects.get(id) {
                visitor(object, self.labels.get(id));
            }
        }
    }

    /// Ids in registration order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &RenderObject> {
        self.order
            .iter()
            .filter_map(|id| self.objects.get(id))
            .filter(|o| o.is_node())
    }

    /// Edges in registration order.
    pub fn edges(&self) -> impl Iterator<Item = &RenderObject> {
        self.order
            .iter()
            .filter_map(|id| self.objects.get(id))
            .filter(|o| !o.is_node())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.objects.values().filter(|o| o.is_node()).count()
    }

    pub fn resources(&self) -> &ResourceArena {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceArena {
        &mut self.resources
    }

    pub fn textures_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    pub fn parts_mut(&mut self) -> SceneParts<'_> {
        SceneParts {
            objects: &mut self.objects,
            labels: &mut self.labels,
            resources: &mut self.resources,
            textures: &mut self.textures,
        }
    }

    /// Dispose every owned resource and forget all entities.
    ///
    /// Returns the counts that were live before teardown.
    pub fn teardown(&mut self) -> ResourceCounts {
        let before = self.resources.counts();
        for object in self.objects.values_mut() {
            object.release_visuals(&mut self.resources);
        }
        // Anything not owned by an object (batches, decorations) goes too.
        self.resources.clear();
        self.textures.clear();
        self.objects.clear();
        self.labels.clear();
        self.entities.clear();
        self.order.clear();
        tracing::info!(
            geometries = before.geometries,
            materials = before.materials,
            "scene torn down"
        );
        before
    }
}
