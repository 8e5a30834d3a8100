//! Selection record handed to the UI on hover and click.

use std::collections::BTreeMap;

use lumen_scene::{EntityKind, VisualEntity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectionInfo {
    Node {
        id: String,
        labels: Vec<String>,
        connections: u32,
        properties: BTreeMap<String, serde_json::Value>,
    },
    Relationship {
        id: String,
        label: String,
        #[serde(rename = "startId")]
        start_id: String,
        #[serde(rename = "endId")]
        end_id: String,
    },
}

impl SelectionInfo {
    pub fn from_entity(entity: &VisualEntity) -> Self {
        match &entity.kind {
            EntityKind::Node { .. } => Self::Node {
                id: entity.id.to_string(),
                labels: entity.labels.clone(),
                connections: entity.connections,
                properties: entity.properties.clone(),
            },
            EntityKind::Relationship { start_id, end_id } => Self::Relationship {
                id: entity.id.to_string(),
                label: entity.primary_label().unwrap_or_default().to_string(),
                start_id: start_id.to_string(),
                end_id: end_id.to_string(),
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Node { id, .. } | Self::Relationship { id, .. } => id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
