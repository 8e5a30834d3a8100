//! Visual entities as delivered by the layout stage.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable identifier of a node or relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What an entity is, with the geometric data only that kind carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Node { position: Vec3 },
    Relationship { start_id: EntityId, end_id: EntityId },
}

/// One ingested record. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Ordered labels; the first one drives label text and color.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Number of relationships touching a node. Zero for relationships.
    #[serde(default)]
    pub connections: u32,
    /// Opaque properties passed through to selection output.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl VisualEntity {
    pub fn node(id: impl Into<String>, position: Vec3, labels: Vec<String>, connections: u32) -> Self {
        Self {
            id: EntityId::new(id),
            kind: EntityKind::Node { position },
            labels,
            connections,
            properties: BTreeMap::new(),
        }
    }

    pub fn relationship(
        id: impl Into<String>,
        label: impl Into<String>,
        start_id: impl Into<String>,
        end_id: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            kind: EntityKind::Relationship {
                start_id: EntityId::new(start_id),
                end_id: EntityId::new(end_id),
            },
            labels: vec![label.into()],
            connections: 0,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, serde_json::Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn is_node(&self) -> bool {
        matches!(self.kind, EntityKind::Node { .. })
    }

    pub fn primary_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}

/// Visual radius of a node: grows with its degree, capped at 90.
pub fn node_base_size(connections: u32) -> f32 {
    20.0 + (connections as f32 * 5.0).min(70.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_size_grows_then_caps() {
        assert_eq!(node_base_size(0), 20.0);
        assert_eq!(node_base_size(4), 40.0);
        assert_eq!(node_base_size(14), 90.0);
        assert_eq!(node_base_size(1_000), 90.0);
    }

    #[test]
    fn test_entity_deserializes_from_layout_json() {
        let json = r#"{
            "id": "n1",
            "kind": { "type": "node", "position": [1.0, 2.0, 3.0] },
            "labels": ["Person"],
            "connections": 3,
            "properties": { "name": "Ada" }
        }"#;
        let entity: VisualEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.id.as_str(), "n1");
        assert_eq!(entity.kind, EntityKind::Node { position: Vec3::new(1.0, 2.0, 3.0) });
        assert_eq!(entity.properties["name"], serde_json::json!("Ada"));
    }

    #[test]
    fn test_relationship_defaults() {
        let json = r#"{ "id": "r1", "kind": { "type": "relationship", "start_id": "a", "end_id": "b" } }"#;
        let entity: VisualEntity = serde_json::from_str(json).unwrap();
        assert!(!entity.is_node());
        assert!(entity.labels.is_empty());
        assert_eq!(entity.connections, 0);
    }
}
