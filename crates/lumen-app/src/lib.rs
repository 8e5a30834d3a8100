//! The graph viewer: wires the scene registry, LOD engine, render policy and
//! camera into a per-frame loop, and feeds it layout snapshots from a
//! background worker.

pub mod error;
pub mod ingest;
pub mod layout;
pub mod picking;
pub mod selection;
pub mod synthetic;
pub mod viewer;

pub use error::ViewerError;
pub use ingest::{INGEST_BATCH_SIZE, IngestStep, SnapshotIngestor};
pub use layout::{
    LayoutNode, LayoutRelationship, LayoutRequest, LayoutSnapshot, LayoutWorker, NodeRecord, Position, RawNode,
};
pub use picking::{PICK_LINE_THRESHOLD, PickHit, pick};
pub use selection::SelectionInfo;
pub use synthetic::{random_layout, synthetic_graph};
pub use viewer::{FrameStats, Viewer};
