//! Layout collaborator boundary.
//!
//! The solver runs on its own thread behind a pair of capacity-1 channels:
//! one [`LayoutRequest`] in, one immutable [`LayoutSnapshot`] out. The viewer
//! polls between frames and never blocks on it.

use std::collections::BTreeMap;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use glam::Vec3;
use lumen_scene::VisualEntity;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// A positioned node as delivered by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    pub position: Position,
    #[serde(default)]
    pub connections: u32,
}

/// `(id, record)`, serialized as a two-element array.
pub type LayoutNode = (String, NodeRecord);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRelationship {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub start_id: String,
    pub end_id: String,
}

/// Solver output: everything needed to register the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub nodes: Vec<LayoutNode>,
    #[serde(default)]
    pub relationships: Vec<LayoutRelationship>,
}

impl LayoutSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Entities in registration order: every node, then every relationship.
    pub fn into_entities(self) -> Vec<VisualEntity> {
        let mut entities = Vec::with_capacity(self.nodes.len() + self.relationships.len());
        for (id, record) in self.nodes {
            entities.push(
                VisualEntity::node(id, record.position.into(), record.labels, record.connections)
                    .with_properties(record.properties),
            );
        }
        for rel in self.relationships {
            entities.push(VisualEntity::relationship(rel.id, rel.label, rel.start_id, rel.end_id));
        }
        entities
    }
}

/// A node before layout: identity and payload only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// Raw graph handed to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub nodes: Vec<RawNode>,
    pub relationships: Vec<LayoutRelationship>,
    /// Edge length of the cube positions must fall in.
    pub space_size: f32,
    #[serde(default)]
    pub seed: u64,
}

/// Background thread running a layout function.
pub struct LayoutWorker {
    request_tx: Option<Sender<LayoutRequest>>,
    response_rx: Receiver<LayoutSnapshot>,
    handle: Option<JoinHandle<()>>,
}

impl LayoutWorker {
    pub fn spawn<F>(mut layout: F) -> Self
    where
        F: FnMut(LayoutRequest) -> LayoutSnapshot + Send + 'static,
    {
        let (request_tx, request_rx) = crossbeam_channel::bounded::<LayoutRequest>(1);
        let (response_tx, response_rx) = crossbeam_channel::bounded(1);

        let handle = std::thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let nodes = request.nodes.len();
                let snapshot = layout(request);
                tracing::debug!(nodes, "layout finished");
                if response_tx.send(snapshot).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx: Some(request_tx),
            response_rx,
            handle: Some(handle),
        }
    }

    /// Queue a request. Fails with [`ViewerError::LayoutBusy`] while one is pending.
    pub fn request(&self, request: LayoutRequest) -> Result<(), ViewerError> {
        let sender = self.request_tx.as_ref().ok_or(ViewerError::LayoutDisconnected)?;
        sender.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => ViewerError::LayoutBusy,
            TrySendError::Disconnected(_) => ViewerError::LayoutDisconnected,
        })
    }

    /// Non-blocking check for a finished snapshot.
    pub fn poll(&self) -> Result<Option<LayoutSnapshot>, ViewerError> {
        match self.response_rx.try_recv() {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ViewerError::LayoutDisconnected),
        }
    }

    /// Block up to `timeout` for a snapshot.
    pub fn wait(&self, timeout: Duration) -> Result<Option<LayoutSnapshot>, ViewerError> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ViewerError::LayoutDisconnected),
        }
    }

    /// Close the request channel and join the thread.
    pub fn shutdown(&mut self) {
        self.request_tx.take();
        // Unblock a worker waiting to hand over a result.
        while self.response_rx.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("layout worker panicked");
        }
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_layout(request: LayoutRequest) -> LayoutSnapshot {
        LayoutSnapshot {
            nodes: request
                .nodes
                .into_iter()
                .enumerate()
                .map(|(i, n)| {
                    (
                        n.id,
                        NodeRecord {
                            labels: n.labels,
                            properties: n.properties,
                            position: Position {
                                x: i as f32 * 100.0,
                                y: 0.0,
                                z: 0.0,
                            },
                            connections: 0,
                        },
                    )
                })
                .collect(),
            relationships: request.relationships,
        }
    }

    fn request(n: usize) -> LayoutRequest {
        LayoutRequest {
            nodes: (0..n)
                .map(|i| RawNode {
                    id: format!("n{i}"),
                    labels: vec!["Person".into()],
                    properties: BTreeMap::new(),
                })
                .collect(),
            relationships: Vec::new(),
            space_size: 1_000.0,
            seed: 0,
        }
    }

    #[test]
    fn test_parse_external_format() {
        let json = r#"{
            "nodes": [["a", {"labels": ["Person"], "properties": {"name": "Ada"},
                             "position": {"x": 1, "y": 2, "z": 3}, "connections": 1}],
                      ["b", {"labels": [], "position": {"x": 0, "y": 0, "z": 0}}]],
            "relationships": [{"id": "r", "label": "KNOWS", "startId": "a", "endId": "b"}]
        }"#;
        let snapshot = LayoutSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.relationships[0].start_id, "a");

        let entities = snapshot.into_entities();
        assert!(entities[0].is_node() && entities[1].is_node());
        assert!(!entities[2].is_node());
        assert_eq!(entities[0].properties["name"], "Ada");
        assert_eq!(entities[0].connections, 1);
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = LayoutWorker::spawn(line_layout);
        worker.request(request(3)).unwrap();
        let snapshot = worker.wait(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.nodes[2].1.position.x, 200.0);
        assert!(worker.poll().unwrap().is_none());
    }

    /// A second request while the first is unanswered is rejected, not queued.
    #[test]
    fn test_capacity_one() {
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let worker = LayoutWorker::spawn(move |req| {
            let _ = gate_rx.recv();
            line_layout(req)
        });
        worker.request(request(1)).unwrap();
        // Wait until the worker has taken the first request off the channel.
        let mut queued = false;
        for _ in 0..100 {
            match worker.request(request(1)) {
                Ok(()) => {
                    queued = true;
                    break;
                }
                Err(ViewerError::LayoutBusy) => std::thread::sleep(Duration::from_millis(5)),
                Err(e) => panic!("unexpected error {e}"),
            }
        }
        assert!(queued);
        assert!(matches!(worker.request(request(1)), Err(ViewerError::LayoutBusy)));
        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
    }
}
