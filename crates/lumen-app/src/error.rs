//! Viewer error types.

use lumen_config::ConfigError;
use lumen_lod::LodError;
use lumen_render::RenderError;
use lumen_scene::{EntityId, SceneError};

/// Errors surfaced by viewer controls and startup.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lod(#[from] LodError),

    /// The id names nothing that can be focused or selected.
    #[error("no object with id {0}")]
    UnknownObject(EntityId),

    /// A layout request is already in flight.
    #[error("layout worker is busy")]
    LayoutBusy,

    /// The layout worker thread has exited.
    #[error("layout worker disconnected")]
    LayoutDisconnected,

    #[error("failed to encode selection: {0}")]
    Selection(#[from] serde_json::Error),
}
