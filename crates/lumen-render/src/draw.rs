//! Per-frame draw list: what a backend would rasterize this frame.
//!
//! Items are sorted opaque-first, then by material and geometry slot so
//! consecutive items share state. Pointer highlight is applied here as
//! per-item overrides; materials in the arena are never edited for it.

use glam::{EulerRot, Mat4, Quat, Vec3};
use lumen_scene::{EntityRegistry, Highlight, Mesh, ObjectShape, RenderObject, ResourceArena};

use crate::instancing::InstancedBatch;

const HOVER_EMISSIVE_SCALE: f32 = 1.5;
const HOVER_NODE_SCALE: f32 = 1.1;
const HOVER_LINE_OPACITY: f32 = 1.0;
const SELECTED_EMISSIVE_INTENSITY: f32 = 1.5;
const SELECTED_LINE_OPACITY: f32 = 0.8;

/// One mesh draw with its resolved per-frame state.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub mesh: Mesh,
    pub transform: Mat4,
    /// Greater than one only for the instanced batch.
    pub instance_count: u32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    /// Line color replaced by the selection highlight.
    pub color_override: Option<[f32; 3]>,
    pub opacity: f32,
    pub transparent: bool,
}

/// Sorted list of draw items plus the sprites shown this frame.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    labels: usize,
    sorted: bool,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            labels: 0,
            sorted: false,
        }
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
        self.sorted = false;
    }

    /// Opaque before transparent, then material slot, then geometry slot.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| {
            a.transparent
                .cmp(&b.transparent)
                .then(a.mesh.material.index().cmp(&b.mesh.material.index()))
                .then(a.mesh.geometry.index().cmp(&b.mesh.geometry.index()))
        });
        self.sorted = true;
    }

    /// Clear for reuse next frame, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.items.clear();
        self.labels = 0;
        self.sorted = false;
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Label sprites shown this frame.
    pub fn label_count(&self) -> usize {
        self.labels
    }

    /// Instances across all items.
    pub fn instance_count(&self) -> u64 {
        self.items.iter().map(|i| i.instance_count as u64).sum()
    }
}

fn item(resources: &ResourceArena, mesh: Mesh, transform: Mat4) -> Option<DrawItem> {
    let material = resources.material(mesh.material)?;
    if !resources.is_live(mesh) {
        return None;
    }
    Some(DrawItem {
        mesh,
        transform,
        instance_count: 1,
        emissive: material.emissive,
        emissive_intensity: material.emissive_intensity,
        color_override: None,
        opacity: material.opacity,
        transparent: material.transparent,
    })
}

fn push_node(list: &mut DrawList, resources: &ResourceArena, object: &RenderObject) {
    let Some(primary) = object.primary() else {
        return;
    };
    let scale = if object.highlight == Highlight::Hovered {
        HOVER_NODE_SCALE
    } else {
        1.0
    };
    let base = Mat4::from_scale_rotation_translation(Vec3::splat(scale), Quat::IDENTITY, object.position());

    if let Some(mut primary) = item(resources, primary, base) {
        match object.highlight {
            Highlight::Hovered => primary.emissive_intensity *= HOVER_EMISSIVE_SCALE,
            Highlight::Selected => {
                primary.emissive = [1.0; 3];
                primary.emissive_intensity = SELECTED_EMISSIVE_INTENSITY;
            }
            Highlight::None => {}
        }
        list.push(primary);
    }

    for aux in object.aux() {
        let rotation = Quat::from_euler(EulerRot::XYZ, aux.rotation.x, aux.rotation.y, aux.rotation.z);
        if let Some(aux_item) = item(resources, aux.mesh, base * Mat4::from_quat(rotation)) {
            list.push(aux_item);
        }
    }
}

fn push_edge(list: &mut DrawList, resources: &ResourceArena, object: &RenderObject) {
    // Line vertices are already in world space.
    let Some(mut line) = object.primary().and_then(|mesh| item(resources, mesh, Mat4::IDENTITY)) else {
        return;
    };
    match object.highlight {
        Highlight::Hovered => line.opacity = HOVER_LINE_OPACITY,
        Highlight::Selected => {
            line.color_override = Some([1.0; 3]);
            line.opacity = SELECTED_LINE_OPACITY;
        }
        Highlight::None => {}
    }
    list.push(line);
}

/// Collect every visible object, its auxiliary meshes, the instanced batch
/// and shown labels into a sorted list.
pub fn build_draw_list(registry: &EntityRegistry, batch: Option<&InstancedBatch>) -> DrawList {
    let mut list = DrawList::with_capacity(registry.len());
    let resources = registry.resources();

    registry.for_each(|object, label| {
        if label.is_some_and(|l| l.visible) {
            list.labels += 1;
        }
        if !object.visible() {
            return;
        }
        match object.shape {
            ObjectShape::Node { .. } => push_node(&mut list, resources, object),
            ObjectShape::Edge { .. } => push_edge(&mut list, resources, object),
        }
    });

    if let Some(batch) = batch.filter(|b| !b.is_empty())
        && let Some(mut instanced) = item(resources, batch.mesh(), Mat4::IDENTITY)
    {
        instanced.instance_count = batch.len() as u32;
        list.push(instanced);
    }

    list.sort();
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_lod::LodEngine;
    use lumen_scene::{QualityContext, QualityMode, VisualEntity};

    fn built_registry(mode: QualityMode) -> (EntityRegistry, QualityContext) {
        let mut registry = EntityRegistry::new();
        registry
            .register(VisualEntity::node("a", Vec3::ZERO, vec!["A".into()], 3))
            .unwrap();
        registry
            .register(VisualEntity::node("b", Vec3::new(100.0, 0.0, 0.0), vec!["B".into()], 1))
            .unwrap();
        registry.register(VisualEntity::relationship("ab", "KNOWS", "a", "b")).unwrap();
        let ctx = QualityContext::new(mode);
        LodEngine::default().evaluate(&mut registry.parts_mut(), &ctx, Vec3::new(0.0, 0.0, 500.0));
        (registry, ctx)
    }

    #[test]
    fn test_draw_list_includes_aux_and_lines() {
        let (registry, _) = built_registry(QualityMode::Standard);
        let list = build_draw_list(&registry, None);
        // Close tier in standard mode: primary + 2 aux per node, one line.
        assert_eq!(list.len(), 2 * 3 + 1);
        assert_eq!(list.label_count(), 3);
        assert!(list.is_sorted());
        // Transparent items come last.
        let first_transparent = list.items().iter().position(|i| i.transparent).unwrap_or(list.len());
        assert!(list.items()[first_transparent..].iter().all(|i| i.transparent));
    }

    #[test]
    fn test_hidden_objects_not_drawn() {
        let (mut registry, _) = built_registry(QualityMode::Performance);
        registry.get_mut(&"a".into()).unwrap().in_frustum = false;
        registry.get_mut(&"a".into()).unwrap().refresh_visibility();
        let list = build_draw_list(&registry, None);
        // Performance tier has no aux: node b and the line.
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_highlight_overrides_without_touching_material() {
        let (mut registry, _) = built_registry(QualityMode::Standard);
        registry.get_mut(&"a".into()).unwrap().highlight = Highlight::Selected;
        registry.get_mut(&"ab".into()).unwrap().highlight = Highlight::Selected;
        let list = build_draw_list(&registry, None);

        let a = registry.get(&"a".into()).unwrap().primary().unwrap();
        let drawn = list.items().iter().find(|i| i.mesh == a).unwrap();
        assert_eq!(drawn.emissive, [1.0; 3]);
        assert_eq!(drawn.emissive_intensity, SELECTED_EMISSIVE_INTENSITY);
        let material = registry.resources().material(a.material).unwrap();
        assert_ne!(material.emissive_intensity, SELECTED_EMISSIVE_INTENSITY);

        let line = registry.get(&"ab".into()).unwrap().primary().unwrap();
        let drawn = list.items().iter().find(|i| i.mesh == line).unwrap();
        assert_eq!(drawn.color_override, Some([1.0; 3]));
        assert_eq!(drawn.opacity, SELECTED_LINE_OPACITY);
    }

    #[test]
    fn test_hover_scales_node() {
        let (mut registry, _) = built_registry(QualityMode::Standard);
        registry.get_mut(&"b".into()).unwrap().highlight = Highlight::Hovered;
        let list = build_draw_list(&registry, None);
        let b = registry.get(&"b".into()).unwrap().primary().unwrap();
        let drawn = list.items().iter().find(|i| i.mesh == b).unwrap();
        let (scale, _, translation) = drawn.transform.to_scale_rotation_translation();
        assert!((scale.x - HOVER_NODE_SCALE).abs() < 1e-5);
        assert_eq!(translation, Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn test_batch_drawn_once_with_instances() {
        let (mut registry, _) = built_registry(QualityMode::Performance);
        let batch = InstancedBatch::build(&mut registry);
        let list = build_draw_list(&registry, Some(&batch));
        // Nodes are hidden behind the batch; the line is still drawn.
        assert_eq!(list.len(), 2);
        assert_eq!(list.instance_count(), 2 + 1);
        batch.dispose(&mut registry);
    }
}
