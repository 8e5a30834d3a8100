//! Scene-side state of the graph viewer: visual entities, their render
//! objects and labels, and the CPU-side resources those objects own.
//!
//! Every geometry and material lives in a [`ResourceArena`] behind typed
//! generational handles, so disposing a mesh is a single, checkable path and
//! live counts double as a leak detector.

mod arena;
mod entity;
mod error;
mod geometry;
mod label;
mod material;
mod object;
mod palette;
mod quality;
mod registry;
mod resources;
mod texture;

pub use arena::{Arena, Handle};
pub use entity::{EntityId, EntityKind, VisualEntity, node_base_size};
pub use error::SceneError;
pub use geometry::{Geometry, GeometryShape, Vertex};
pub use label::{
    LABEL_BASE_HEIGHT, LABEL_BASE_WIDTH, LabelObject, NODE_LABEL_LIFT, RELATIONSHIP_LABEL_LIFT,
    truncate_label_text,
};
pub use material::{Blending, FaceSide, Material, MaterialKind};
pub use object::{AuxMesh, AuxRole, BuildStamp, Highlight, LodTier, ObjectShape, RenderObject};
pub use palette::{LabelPalette, NEON_PALETTE, RELATIONSHIP_LABEL_COLOR, rgb_from_hex};
pub use quality::{QualityContext, QualityMode};
pub use registry::{EntityRegistry, SceneParts};
pub use resources::{Mesh, ResourceArena, ResourceCounts};
pub use texture::{
    AlphaTexture, CLOUD_TEXTURE_SIZE, CubeTexture, ENV_MAP_COLORS, ENV_MAP_FACE_SIZE,
    TextureCache, direction_to_cube_face_uv,
};
