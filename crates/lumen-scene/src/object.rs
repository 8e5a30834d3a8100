//! Render-side state of one visual entity.

use glam::Vec3;

use crate::entity::{EntityId, node_base_size};
use crate::quality::{QualityContext, QualityMode};
use crate::resources::{Mesh, ResourceArena};

/// Detail tier of a node. `None` means nothing has been built yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum LodTier {
    #[default]
    None,
    Far,
    Medium,
    Close,
}

impl LodTier {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Far => "far",
            Self::Medium => "medium",
            Self::Close => "close",
        }
    }
}

/// Purpose of an auxiliary sub-mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxRole {
    InnerCore,
    GlowShell,
    Atmosphere,
    PolarRing,
    CloudOverlay,
}

/// Sub-mesh owned by a node in addition to its primary mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxMesh {
    pub role: AuxRole,
    pub mesh: Mesh,
    /// Euler rotation (radians) relative to the node.
    pub rotation: Vec3,
}

/// Mode and epoch a node's visuals were built under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStamp {
    pub mode: QualityMode,
    pub epoch: u64,
}

/// Pointer interaction state, applied at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Hovered,
    Selected,
}

/// Geometry-independent placement data.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    Node {
        position: Vec3,
        base_size: f32,
    },
    Edge {
        start_id: EntityId,
        end_id: EntityId,
        start: Vec3,
        end: Vec3,
    },
}

/// Mutable render state of a node or relationship.
///
/// `current_lod`, `quality_applied` and `built` always describe the meshes
/// held in `primary` and `aux`; only [`RenderObject::install`] and
/// [`RenderObject::release_visuals`] change them.
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub id: EntityId,
    pub shape: ObjectShape,
    /// Palette color, `0xRRGGBB`.
    pub color: u32,
    current_lod: LodTier,
    quality_applied: bool,
    built: Option<BuildStamp>,
    primary: Option<Mesh>,
    aux: Vec<AuxMesh>,
    /// Set by the visibility controller.
    pub in_frustum: bool,
    /// Set by the LOD engine's distance band.
    pub in_range: bool,
    /// Hidden because the instanced batch draws this node.
    pub batched: bool,
    visible: bool,
    pub highlight: Highlight,
}

impl RenderObject {
    pub fn new_node(id: EntityId, position: Vec3, connections: u32, color: u32) -> Self {
        Self::new(
            id,
            ObjectShape::Node {
                position,
                base_size: node_base_size(connections),
            },
            color,
        )
    }

    pub fn new_edge(id: EntityId, start_id: EntityId, end_id: EntityId, start: Vec3, end: Vec3) -> Self {
        Self::new(
            id,
            ObjectShape::Edge {
                start_id,
                end_id,
                start,
                end,
            },
            0xffffff,
        )
    }

    fn new(id: EntityId, shape: ObjectShape, color: u32) -> Self {
        Self {
            id,
            shape,
            color,
            current_lod: LodTier::None,
            quality_applied: false,
            built: None,
            primary: None,
            aux: Vec::new(),
            in_frustum: true,
            in_range: true,
            batched: false,
            visible: true,
            highlight: Highlight::None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self.shape, ObjectShape::Node { .. })
    }

    /// Node position, or an edge's midpoint.
    pub fn position(&self) -> Vec3 {
        match &self.shape {
            ObjectShape::Node { position, .. } => *position,
            ObjectShape::Edge { start, end, .. } => (*start + *end) * 0.5,
        }
    }

    /// Node base size; `None` for edges.
    pub fn base_size(&self) -> Option<f32> {
        match self.shape {
            ObjectShape::Node { base_size, .. } => Some(base_size),
            ObjectShape::Edge { .. } => None,
        }
    }

    pub fn current_lod(&self) -> LodTier {
        self.current_lod
    }

    pub fn quality_applied(&self) -> bool {
        self.quality_applied
    }

    pub fn built(&self) -> Option<BuildStamp> {
        self.built
    }

    pub fn primary(&self) -> Option<Mesh> {
        self.primary
    }

    pub fn aux(&self) -> &[AuxMesh] {
        &self.aux
    }

    pub fn aux_mut(&mut self) -> &mut [AuxMesh] {
        &mut self.aux
    }

    pub fn aux_count(&self, role: AuxRole) -> usize {
        self.aux.iter().filter(|a| a.role == role).count()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// True if built under a different mode or epoch than `ctx`.
    pub fn is_stale(&self, ctx: &QualityContext) -> bool {
        match self.built {
            Some(stamp) => stamp.mode != ctx.mode() || stamp.epoch != ctx.epoch(),
            None => true,
        }
    }

    /// True when the primary mesh is missing or no longer resolves.
    pub fn needs_construction(&self, resources: &ResourceArena) -> bool {
        match self.primary {
            Some(mesh) => !resources.is_live(mesh),
            None => true,
        }
    }

    /// Recompute node visibility from its inputs. Returns true if it changed.
    pub fn refresh_visibility(&mut self) -> bool {
        let visible = self.in_frustum && self.in_range && !self.batched;
        let changed = visible != self.visible;
        self.visible = visible;
        changed
    }

    /// Edges have no range band; the culling controller decides directly.
    pub fn set_edge_visible(&mut self, visible: bool) {
        debug_assert!(!self.is_node());
        self.visible = visible;
    }

    /// Install freshly built visuals. Any previous visuals must already be released.
    pub fn install(&mut self, primary: Mesh, aux: Vec<AuxMesh>, tier: LodTier, quality_applied: bool, stamp: BuildStamp) {
        debug_assert!(self.primary.is_none() && self.aux.is_empty());
        self.primary = Some(primary);
        self.aux = aux;
        self.current_lod = tier;
        self.quality_applied = quality_applied;
        self.built = Some(stamp);
    }

    /// Attach an edge's line mesh. Edges carry no tier or build stamp.
    pub fn attach_line(&mut self, line: Mesh) {
        debug_assert!(!self.is_node() && self.primary.is_none());
        self.primary = Some(line);
    }

    /// Dispose primary and auxiliary meshes. Returns the number of meshes released.
    pub fn release_visuals(&mut self, resources: &mut ResourceArena) -> usize {
        let mut released = 0;
        if let Some(mesh) = self.primary.take()
            && resources.dispose_mesh(mesh)
        {
            released += 1;
        }
        for aux in self.aux.drain(..) {
            if resources.dispose_mesh(aux.mesh) {
                released += 1;
            }
        }
        self.current_lod = LodTier::None;
        self.quality_applied = false;
        self.built = None;
        released
    }

    /// Radius used for picking and focus distance.
    pub fn bounding_radius(&self, resources: &ResourceArena) -> f32 {
        let from_geometry = self
            .primary
            .and_then(|mesh| resources.geometry(mesh.geometry))
            .map(|g| g.bounding_radius);
        match (from_geometry, self.base_size()) {
            (Some(r), _) => r,
            (None, Some(size)) => size,
            (None, None) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::material::Material;

    fn node() -> RenderObject {
        RenderObject::new_node(EntityId::from("n"), Vec3::new(1.0, 2.0, 3.0), 2, 0xff00ff)
    }

    #[test]
    fn test_new_node_is_unbuilt() {
        let obj = node();
        let resources = ResourceArena::new();
        assert_eq!(obj.current_lod(), LodTier::None);
        assert!(!obj.quality_applied());
        assert!(obj.needs_construction(&resources));
        assert_eq!(obj.base_size(), Some(30.0));
        assert_eq!(obj.bounding_radius(&resources), 30.0);
    }

    #[test]
    fn test_visibility_requires_all_inputs() {
        let mut obj = node();
        obj.in_range = false;
        assert!(obj.refresh_visibility());
        assert!(!obj.visible());
        obj.in_range = true;
        obj.batched = true;
        assert!(!obj.refresh_visibility());
        assert!(!obj.visible());
        obj.batched = false;
        assert!(obj.refresh_visibility());
        assert!(obj.visible());
    }

    #[test]
    fn test_release_resets_tier_and_frees_meshes() {
        let mut resources = ResourceArena::new();
        let mut obj = node();
        let primary = resources.create_mesh(Geometry::octahedron(24.0), Material::standard([1.0; 3]));
        let core = resources.create_mesh(Geometry::icosahedron(21.0), Material::standard([1.0; 3]));
        obj.install(
            primary,
            vec![AuxMesh {
                role: AuxRole::InnerCore,
                mesh: core,
                rotation: Vec3::ZERO,
            }],
            LodTier::Medium,
            false,
            BuildStamp {
                mode: QualityMode::Standard,
                epoch: 0,
            },
        );
        assert_eq!(obj.bounding_radius(&resources), 24.0);
        assert!(!obj.is_stale(&QualityContext::new(QualityMode::Standard)));

        assert_eq!(obj.release_visuals(&mut resources), 2);
        assert_eq!(resources.counts().total(), 0);
        assert_eq!(obj.current_lod(), LodTier::None);
        assert!(obj.aux().is_empty());
        assert!(obj.is_stale(&QualityContext::new(QualityMode::Standard)));
    }

    #[test]
    fn test_edge_position_is_midpoint() {
        let edge = RenderObject::new_edge(
            EntityId::from("r"),
            EntityId::from("a"),
            EntityId::from("b"),
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
        );
        assert_eq!(edge.position(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(edge.base_size(), None);
    }
}
