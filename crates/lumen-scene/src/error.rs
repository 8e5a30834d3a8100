//! Scene error types.

use crate::EntityId;

/// Errors raised while registering or mutating scene entities.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SceneError {
    /// A relationship references a node id that is not registered.
    #[error("relationship {relationship} references unknown node {missing}")]
    DanglingReference {
        relationship: EntityId,
        missing: EntityId,
    },

    /// A relationship endpoint resolves to another relationship.
    #[error("relationship {relationship} endpoint {endpoint} is not a node")]
    EndpointNotANode {
        relationship: EntityId,
        endpoint: EntityId,
    },

    /// No entity is registered under this id.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}
