//! # Store Errors
//!
//! Common error types shared by every store actor and client. Entity-level
//! failures are boxed so a single error type can cross the channel for any
//! collection; [`StoreError::entity`] recovers the concrete type.

/// Errors that can occur within a store actor or while talking to it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    Entity(Box<dyn std::error::Error + Send + Sync>),
    #[error("Persistence error for collection '{key}': {source}")]
    Persistence {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Collection '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Returns the entity error if it is of type `E`.
    pub fn entity<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            StoreError::Entity(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// True for failures of the channel itself rather than of the request.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, StoreError::ActorClosed | StoreError::ActorDropped)
    }
}
