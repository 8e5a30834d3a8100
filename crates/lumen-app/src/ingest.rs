//! Between-frame merging of layout snapshots into the registry.

use std::collections::VecDeque;

use lumen_scene::{EntityRegistry, VisualEntity};

use crate::layout::LayoutSnapshot;

/// Entities registered per between-frame step.
pub const INGEST_BATCH_SIZE: usize = 50;

/// Result of one [`SnapshotIngestor::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStep {
    pub registered: usize,
    /// Relationships dropped for an unresolved endpoint.
    pub skipped: usize,
    /// Entities still queued.
    pub remaining: usize,
}

/// Queue of entities waiting to be registered.
#[derive(Debug, Default)]
pub struct SnapshotIngestor {
    queue: VecDeque<VisualEntity>,
}

impl SnapshotIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every entity of `snapshot`, nodes ahead of relationships.
    pub fn enqueue(&mut self, snapshot: LayoutSnapshot) {
        let nodes = snapshot.nodes.len();
        let relationships = snapshot.relationships.len();
        self.queue.extend(snapshot.into_entities());
        tracing::info!(nodes, relationships, "layout snapshot queued");
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Register up to [`INGEST_BATCH_SIZE`] queued entities.
    pub fn step(&mut self, registry: &mut EntityRegistry) -> IngestStep {
        let mut step = IngestStep::default();
        for _ in 0..INGEST_BATCH_SIZE {
            let Some(entity) = self.queue.pop_front() else {
                break;
            };
            match registry.register(entity) {
                Ok(_) => step.registered += 1,
                Err(e) => {
                    tracing::warn!("skipping entity: {e}");
                    step.skipped += 1;
                }
            }
        }
        step.remaining = self.queue.len();
        step
    }

    /// Register everything queued.
    pub fn drain(&mut self, registry: &mut EntityRegistry) -> IngestStep {
        let mut total = IngestStep::default();
        while !self.is_idle() {
            let step = self.step(registry);
            total.registered += step.registered;
            total.skipped += step.skipped;
        }
        total
    }
}
