//! Billboard text labels anchored to nodes and relationships.

use glam::{Vec2, Vec3};

use crate::entity::EntityId;

pub const LABEL_BASE_WIDTH: f32 = 200.0;
pub const LABEL_BASE_HEIGHT: f32 = 50.0;

/// Height above a node's surface at which its label floats.
pub const NODE_LABEL_LIFT: f32 = 30.0;

/// Height above a relationship's midpoint at which its label floats.
pub const RELATIONSHIP_LABEL_LIFT: f32 = 20.0;

const MAX_LABEL_CHARS: usize = 20;
const TRUNCATED_CHARS: usize = 18;

/// Shorten text longer than 20 characters to 18 plus an ellipsis.
pub fn truncate_label_text(text: &str) -> String {
    if text.chars().count() > MAX_LABEL_CHARS {
        let mut short: String = text.chars().take(TRUNCATED_CHARS).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}

/// Sprite label belonging to exactly one render object.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelObject {
    pub owner: EntityId,
    pub text: String,
    pub color: u32,
    pub for_relationship: bool,
    /// Resting position the label is drawn at.
    pub anchor: Vec3,
    /// Sprite size in world units.
    pub size: Vec2,
    pub visible: bool,
}

impl LabelObject {
    pub fn for_node(owner: EntityId, label: Option<&str>, color: u32, position: Vec3, base_size: f32) -> Self {
        let text = match label {
            Some(l) if !l.is_empty() => truncate_label_text(l),
            _ => format!("Node {owner}"),
        };
        Self {
            owner,
            text,
            color,
            for_relationship: false,
            anchor: position + Vec3::new(0.0, base_size + NODE_LABEL_LIFT, 0.0),
            size: Vec2::new(LABEL_BASE_WIDTH, LABEL_BASE_HEIGHT),
            visible: true,
        }
    }

    pub fn for_relationship(owner: EntityId, label: Option<&str>, color: u32, start: Vec3, end: Vec3) -> Self {
        let text = match label {
            Some(l) if !l.is_empty() => truncate_label_text(l),
            _ => format!("Rel {owner}"),
        };
        Self {
            owner,
            text,
            color,
            for_relationship: true,
            anchor: (start + end) * 0.5 + Vec3::new(0.0, RELATIONSHIP_LABEL_LIFT, 0.0),
            size: Vec2::new(LABEL_BASE_WIDTH, LABEL_BASE_HEIGHT),
            visible: true,
        }
    }

    /// Scale the sprite relative to its base size.
    pub fn set_scale(&mut self, scale: f32) {
        self.size = Vec2::new(LABEL_BASE_WIDTH * scale, LABEL_BASE_HEIGHT * scale);
    }
}
