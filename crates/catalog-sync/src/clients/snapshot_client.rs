//! # Snapshot Client
//!
//! Domain API over the local snapshot's `StoreClient<BookRecord>`.
use crate::model::{BookId, BookPatch, BookRecord};
use actor_store::{StoreBacked, StoreClient, StoreError};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SnapshotClient {
    inner: StoreClient<BookRecord>,
}

impl SnapshotClient {
    pub fn new(inner: StoreClient<BookRecord>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StoreBacked<BookRecord> for SnapshotClient {
    type Error = StoreError;

    fn inner(&self) -> &StoreClient<BookRecord> {
        &self.inner
    }
}

impl SnapshotClient {
    /// Replaces the whole snapshot with a fresh remote view.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn replace_all(&self, records: Vec<BookRecord>) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.replace_all(records).await
    }

    /// Inserts `record`, or overwrites the entry with the same id in place.
    #[instrument(skip(self, record), fields(id = %record.id))]
    pub async fn merge(&self, record: BookRecord) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.upsert(record).await
    }

    /// Adds an optimistic record. Fails if the id is taken.
    #[instrument(skip(self, record), fields(id = %record.id))]
    pub async fn insert(&self, record: BookRecord) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.insert(record).await
    }

    /// Puts a confirmed record into the slot held by a provisional one.
    #[instrument(skip(self, record), fields(id = %record.id))]
    pub async fn swap(&self, provisional: BookId, record: BookRecord) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.replace(provisional, record).await
    }

    /// Applies `patch` in place. `StoreError::NotFound` when the id is absent.
    #[instrument(skip(self))]
    pub async fn patch(&self, id: BookId, patch: BookPatch) -> Result<BookRecord, StoreError> {
        debug!("Sending request");
        self.inner.update(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: BookId) -> Result<Option<BookRecord>, StoreError> {
        debug!("Sending request");
        self.inner.remove(id).await
    }
}
