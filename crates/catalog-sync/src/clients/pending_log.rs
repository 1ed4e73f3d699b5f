//! # Pending-Operation Log
//!
//! Domain API over the pending actor's `StoreClient<PendingOperation>`.
use crate::model::{BookId, OperationId, PendingOperation};
use crate::pending_actor::OperationUpdate;
use actor_store::{StoreBacked, StoreClient, StoreError};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct PendingLog {
    inner: StoreClient<PendingOperation>,
}

impl PendingLog {
    pub fn new(inner: StoreClient<PendingOperation>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StoreBacked<PendingOperation> for PendingLog {
    type Error = StoreError;

    fn inner(&self) -> &StoreClient<PendingOperation> {
        &self.inner
    }
}

impl PendingLog {
    /// Appends `op` to the end of the log.
    #[instrument(skip(self, op), fields(id = %op.id, kind = op.kind.name()))]
    pub async fn enqueue(&self, op: PendingOperation) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.insert(op).await?;
        info!("operation queued for replay");
        Ok(())
    }

    /// The log in enqueue order.
    pub async fn operations(&self) -> Result<Vec<PendingOperation>, StoreError> {
        self.inner.all().await
    }

    pub async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.inner.all().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Removes the operations the remote service accepted.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn acknowledge(&self, ids: Vec<OperationId>) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        debug!("Sending request");
        self.inner.remove_many(ids).await
    }

    /// Points every queued update aimed at `from` at `to`. Returns how many moved.
    #[instrument(skip(self))]
    pub async fn retarget(&self, from: &BookId, to: &BookId) -> Result<usize, StoreError> {
        let affected: Vec<OperationId> = self
            .inner
            .all()
            .await?
            .into_iter()
            .filter(|op| op.target() == Some(from))
            .map(|op| op.id)
            .collect();

        for id in &affected {
            self.inner
                .update(id.clone(), OperationUpdate::Retarget(to.clone()))
                .await?;
        }
        Ok(affected.len())
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<usize, StoreError> {
        debug!("Sending request");
        self.inner.clear().await
    }
}
