//! # StoreBacked Trait
//!
//! Common reads for domain-specific wrappers around a [`StoreClient`].
use crate::{StoreClient, StoreEntity, StoreError};
use async_trait::async_trait;

/// Trait for collection-specific wrappers to inherit the standard reads.
///
/// Implementors provide the inner client and an error mapping; `get` and
/// `all` come for free.
#[async_trait]
pub trait StoreBacked<T: StoreEntity>: Send + Sync {
    /// The collection-specific error type.
    type Error: From<StoreError> + Send + Sync;

    /// Access the inner generic StoreClient.
    fn inner(&self) -> &StoreClient<T>;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::Error::from)
    }

    /// Every entity in stored order.
    #[tracing::instrument(skip(self))]
    async fn all(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().all().await.map_err(Self::Error::from)
    }
}
