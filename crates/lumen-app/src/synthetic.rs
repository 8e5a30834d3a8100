//! Seeded synthetic graphs and a random-placement layout for the demo.

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::layout::{LayoutRelationship, LayoutRequest, LayoutSnapshot, NodeRecord, Position, RawNode};

const LABELS: [&str; 6] = ["Person", "Company", "Project", "City", "Event", "Document"];
const RELATIONSHIP_LABELS: [&str; 4] = ["KNOWS", "WORKS_AT", "LOCATED_IN", "REFERENCES"];

/// A random graph of `nodes` nodes: a spanning tree plus one extra
/// relationship per four nodes.
pub fn synthetic_graph(nodes: usize, space_size: f32, seed: u64) -> LayoutRequest {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let raw: Vec<RawNode> = (0..nodes)
        .map(|i| {
            let label = LABELS[rng.random_range(0..LABELS.len())];
            let mut properties = BTreeMap::new();
            properties.insert("name".to_string(), serde_json::json!(format!("{label} {i}")));
            properties.insert("weight".to_string(), serde_json::json!(rng.random_range(0..100)));
            RawNode {
                id: format!("n{i}"),
                labels: vec![label.to_string()],
                properties,
            }
        })
        .collect();

    let mut relationships = Vec::new();
    if nodes > 1 {
        for i in 1..nodes {
            let parent = rng.random_range(0..i);
            relationships.push(relationship(&mut rng, relationships.len(), parent, i));
        }
        for _ in 0..nodes / 4 {
            let a = rng.random_range(0..nodes);
            let b = rng.random_range(0..nodes);
            if a != b {
                relationships.push(relationship(&mut rng, relationships.len(), a, b));
            }
        }
    }

    LayoutRequest {
        nodes: raw,
        relationships,
        space_size,
        seed,
    }
}

fn relationship(rng: &mut ChaCha8Rng, index: usize, start: usize, end: usize) -> LayoutRelationship {
    LayoutRelationship {
        id: format!("r{index}"),
        label: RELATIONSHIP_LABELS[rng.random_range(0..RELATIONSHIP_LABELS.len())].to_string(),
        start_id: format!("n{start}"),
        end_id: format!("n{end}"),
    }
}

/// Place every node uniformly inside the space cube centred on the origin
/// and count connections per node.
pub fn random_layout(request: LayoutRequest) -> LayoutSnapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(request.seed.wrapping_add(1));
    let half = request.space_size.abs() / 2.0;

    let mut connections: HashMap<String, u32> = HashMap::new();
    for rel in &request.relationships {
        *connections.entry(rel.start_id.clone()).or_default() += 1;
        *connections.entry(rel.end_id.clone()).or_default() += 1;
    }

    let mut coord = || if half > 0.0 { rng.random_range(-half..=half) } else { 0.0 };
    let nodes = request
        .nodes
        .iter()
        .map(|node| {
            let position = Position {
                x: coord(),
                y: coord(),
                z: coord(),
            };
            (
                node.id.clone(),
                NodeRecord {
                    labels: node.labels.clone(),
                    properties: node.properties.clone(),
                    position,
                    connections: connections.get(&node.id).copied().unwrap_or(0),
                },
            )
        })
        .collect();

    LayoutSnapshot {
        nodes,
        relationships: request.relationships,
    }
}
