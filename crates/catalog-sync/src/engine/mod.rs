//! # Synchronization Engine
//!
//! Serves catalog reads and writes with a local-first fallback.
//!
//! - **Reads** (`list`, `get`) replay the pending log first, then ask the
//!   remote service. A successful list replaces the snapshot; any failure is
//!   answered from the snapshot with [`Provenance::LocalSnapshot`].
//! - **Creates and updates** go to the remote service. If it is unreachable
//!   the change is applied to the snapshot and queued, and the caller gets
//!   a record marked [`Confirmation::Unconfirmed`](crate::model::Confirmation).
//!   Refusals are returned as errors.
//! - **Deletes** are never queued. Any failure reaches the caller.
//!
//! ## Replay
//!
//! [`SyncEngine::replay`] walks the log once in enqueue order. A failed
//! operation stays queued and does not block the ones after it. The pass
//! removes exactly the operations that succeeded. A confirmed create swaps
//! the provisional record for the server one and points later queued updates
//! at the server id. If those updates cannot be retargeted the create counts
//! as failed and is resent, under the same idempotency key, next pass. Replays are
//! serialized by an async gate, so two callers never send the same operation
//! in overlapping passes.
//!
//! ```rust,ignore
//! let engine = SyncEngine::new(api, probe, snapshot_client, pending_log);
//! let page = engine.list(BookFilters::default().search("dune")).await?;
//! if page.provenance.is_offline() {
//!     // render a "working offline" indicator
//! }
//! ```

pub mod error;
pub mod fallback;

pub use error::SyncError;
pub use fallback::query_snapshot;

use crate::clients::{PendingLog, SnapshotClient};
use crate::model::{
    BookFilters, BookId, BookInput, BookPatch, BookRecord, Fetched, OperationId, OperationKind,
    PagedResult, PendingOperation, Provenance, Written,
};
use crate::remote::{AvailabilityProbe, CatalogApi, RemoteError};
use actor_store::{StoreBacked, StoreError};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Served when the remote category list cannot be fetched.
pub const FALLBACK_CATEGORIES: [&str; 6] = [
    "Fiction",
    "Non-Fiction",
    "Science",
    "History",
    "Technology",
    "Children",
];

/// Page size used by [`SyncEngine::force_sync`] to refresh the snapshot.
pub const REFRESH_PAGE_SIZE: u32 = 1000;

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub attempted: usize,
    pub applied: usize,
    pub failed: usize,
    /// The probe reported the service down; nothing was sent.
    pub skipped: bool,
}

#[derive(Clone)]
pub struct SyncEngine {
    api: Arc<dyn CatalogApi>,
    probe: AvailabilityProbe,
    snapshot: SnapshotClient,
    pending: PendingLog,
    replay_gate: Arc<Mutex<()>>,
}

impl SyncEngine {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        probe: AvailabilityProbe,
        snapshot: SnapshotClient,
        pending: PendingLog,
    ) -> Self {
        Self {
            api,
            probe,
            snapshot,
            pending,
            replay_gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn is_online(&self) -> bool {
        self.probe.check_availability().await
    }

    /// A page of books, from the remote service when possible.
    #[instrument(skip(self))]
    pub async fn list(&self, filters: BookFilters) -> Result<PagedResult<BookRecord>, SyncError> {
        if let Err(e) = self.replay().await {
            warn!(error = %e, "replay before list failed");
        }

        match self.api.list_books(&filters).await {
            Ok(page) => {
                let items: Vec<BookRecord> =
                    page.items.into_iter().map(BookRecord::normalized).collect();
                if let Err(e) = self.snapshot.replace_all(items.clone()).await {
                    warn!(error = %e, "list: failed to refresh snapshot");
                }
                let per_page = match page.per_page {
                    0 => filters.effective_per_page(),
                    n => n,
                };
                Ok(PagedResult::new(items, page.total, page.page, per_page, Provenance::Remote))
            }
            Err(e) => {
                warn!(error = %e, "list: remote unavailable, serving local snapshot");
                let records = self.snapshot.all().await?;
                Ok(query_snapshot(&records, &filters))
            }
        }
    }

    /// One book. Falls back to the snapshot only when the service is unreachable.
    #[instrument(skip(self))]
    pub async fn get(&self, id: BookId) -> Result<Fetched<BookRecord>, SyncError> {
        match self.api.get_book(&id).await {
            Ok(record) => {
                let record = record.normalized();
                if let Err(e) = self.snapshot.merge(record.clone()).await {
                    warn!(error = %e, "get: failed to refresh snapshot");
                }
                Ok(Fetched {
                    item: record,
                    provenance: Provenance::Remote,
                })
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "get: remote unavailable, serving local snapshot");
                match self.snapshot.get(id.clone()).await? {
                    Some(record) => Ok(Fetched {
                        item: record,
                        provenance: Provenance::LocalSnapshot,
                    }),
                    None => Err(SyncError::NotInSnapshot(id)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates a book, or records it locally and queues it if the service is down.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: BookInput) -> Result<Written<BookRecord>, SyncError> {
        let is_available = input.availability()?;
        debug!(is_available, "create");

        let key = OperationId::generate();
        match self.api.create_book(&input, &key).await {
            Ok(record) => {
                let record = record.normalized();
                if let Err(e) = self.snapshot.merge(record.clone()).await {
                    warn!(error = %e, "create: failed to record confirmed book");
                }
                info!(id = %record.id, "created");
                Ok(Written::confirmed(record))
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "create: remote unavailable, queueing");
                let provisional = BookId::provisional();
                let record = BookRecord::from_input(provisional.clone(), &input, Utc::now());
                self.snapshot.insert(record.clone()).await?;
                let op = PendingOperation::create(key, provisional.clone(), input);
                if let Err(e) = self.pending.enqueue(op).await {
                    // Without its queued create the record would never reach the service.
                    if let Err(undo) = self.snapshot.remove(provisional).await {
                        warn!(error = %undo, "create: failed to withdraw unqueued record");
                    }
                    return Err(e.into());
                }
                Ok(Written::unconfirmed(record))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Updates a book, or patches the snapshot and queues the patch if the service is down.
    ///
    /// Provisional ids are unknown to the service, so their updates are always queued.
    /// They are queued under the replay gate, so a pass that confirms the create
    /// either sees the update and retargets it, or has already swapped the
    /// provisional record out and the update fails with
    /// [`SyncError::NotInSnapshot`].
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: BookId, patch: BookPatch) -> Result<Written<BookRecord>, SyncError> {
        let _gate = if id.is_provisional() {
            Some(self.replay_gate.lock().await)
        } else {
            None
        };

        if !id.is_provisional() {
            match self.api.update_book(&id, &patch).await {
                Ok(record) => {
                    let record = record.normalized();
                    if let Err(e) = self.snapshot.merge(record.clone()).await {
                        warn!(error = %e, "update: failed to record confirmed book");
                    }
                    info!("updated");
                    return Ok(Written::confirmed(record));
                }
                Err(e) if e.is_transient() => {
                    warn!(error = %e, "update: remote unavailable, queueing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let Some(before) = self.snapshot.get(id.clone()).await? else {
            return Err(SyncError::NotInSnapshot(id));
        };
        let record = match self.snapshot.patch(id.clone(), patch.clone()).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => return Err(SyncError::NotInSnapshot(id)),
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = self.pending.enqueue(PendingOperation::update(id, patch)).await {
            // An edit the log does not hold must not be shown as current.
            if let Err(undo) = self.snapshot.merge(before).await {
                warn!(error = %undo, "update: failed to restore unqueued edit");
            }
            return Err(e.into());
        }
        Ok(Written::unconfirmed(record))
    }

    /// Deletes a book remotely, then locally. Never queued.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: BookId) -> Result<(), SyncError> {
        self.api.delete_book(&id).await?;
        self.snapshot.remove(id).await?;
        info!("deleted");
        Ok(())
    }

    pub async fn categories(&self) -> BTreeSet<String> {
        match self.api.categories().await {
            Ok(categories) => categories.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "categories: remote unavailable, using defaults");
                FALLBACK_CATEGORIES.iter().map(|c| c.to_string()).collect()
            }
        }
    }

    /// Sends every queued operation, in order, if the service is reachable.
    #[instrument(skip(self))]
    pub async fn replay(&self) -> Result<ReplayReport, SyncError> {
        let _gate = self.replay_gate.lock().await;

        let operations = self.pending.operations().await?;
        if operations.is_empty() {
            return Ok(ReplayReport::default());
        }
        if !self.probe.check_availability().await {
            info!(queued = operations.len(), "replay skipped, remote unavailable");
            return Ok(ReplayReport {
                skipped: true,
                ..ReplayReport::default()
            });
        }

        let mut report = ReplayReport {
            attempted: operations.len(),
            ..ReplayReport::default()
        };
        let mut confirmed_ids: HashMap<BookId, BookId> = HashMap::new();
        let mut applied: Vec<OperationId> = Vec::new();

        for op in operations {
            let outcome = match &op.kind {
                OperationKind::Create {
                    provisional_id,
                    input,
                } => self
                    .replay_create(&op.id, provisional_id, input, &mut confirmed_ids)
                    .await,
                OperationKind::Update { id, patch } => {
                    let target = confirmed_ids.get(id).unwrap_or(id);
                    self.replay_update(target, patch).await
                }
            };

            match outcome {
                Ok(()) => {
                    debug!(id = %op.id, kind = op.kind.name(), "replayed");
                    applied.push(op.id);
                }
                Err(e) => {
                    warn!(id = %op.id, kind = op.kind.name(), error = %e, "replay failed, keeping operation");
                    report.failed += 1;
                }
            }
        }

        report.applied = self.pending.acknowledge(applied).await?;
        info!(
            attempted = report.attempted,
            applied = report.applied,
            failed = report.failed,
            "replay finished"
        );
        Ok(report)
    }

    async fn replay_create(
        &self,
        key: &OperationId,
        provisional_id: &BookId,
        input: &BookInput,
        confirmed_ids: &mut HashMap<BookId, BookId>,
    ) -> Result<(), RemoteError> {
        let record = self.api.create_book(input, key).await?.normalized();
        let server_id = record.id.clone();

        if let Err(e) = self.snapshot.swap(provisional_id.clone(), record).await {
            warn!(error = %e, %server_id, "replay: failed to swap provisional record");
        }
        // The create stays queued until its updates point at the server id.
        // Resending it is deduplicated by the idempotency key.
        match self.pending.retarget(provisional_id, &server_id).await {
            Ok(moved) => {
                if moved > 0 {
                    debug!(moved, %server_id, "retargeted queued updates");
                }
                confirmed_ids.insert(provisional_id.clone(), server_id);
                Ok(())
            }
            Err(e) => Err(RemoteError::Unavailable(format!(
                "created as {server_id} but queued updates were not retargeted: {e}"
            ))),
        }
    }

    async fn replay_update(&self, id: &BookId, patch: &BookPatch) -> Result<(), RemoteError> {
        if id.is_provisional() {
            return Err(RemoteError::Unavailable(format!(
                "create for {id} has not been confirmed"
            )));
        }
        let record = self.api.update_book(id, patch).await?.normalized();
        if let Err(e) = self.snapshot.merge(record).await {
            warn!(error = %e, %id, "replay: failed to record confirmed update");
        }
        Ok(())
    }

    /// Replays, then refreshes the snapshot from the first large remote page.
    #[instrument(skip(self))]
    pub async fn force_sync(&self) -> Result<ReplayReport, SyncError> {
        let report = self.replay().await?;
        let filters = BookFilters::default().page(1, REFRESH_PAGE_SIZE);
        let page = self.api.list_books(&filters).await?;
        let items: Vec<BookRecord> = page.items.into_iter().map(BookRecord::normalized).collect();
        info!(count = items.len(), "snapshot refreshed");
        self.snapshot.replace_all(items).await?;
        Ok(report)
    }

    pub async fn pending(&self) -> Result<Vec<PendingOperation>, SyncError> {
        Ok(self.pending.operations().await?)
    }

    pub async fn pending_count(&self) -> Result<usize, SyncError> {
        Ok(self.pending.len().await?)
    }

    /// Drops every queued operation without sending it.
    #[instrument(skip(self))]
    pub async fn clear_pending(&self) -> Result<usize, SyncError> {
        let cleared = self.pending.clear().await?;
        warn!(cleared, "pending operations discarded");
        Ok(cleared)
    }

    pub async fn snapshot(&self) -> Result<Vec<BookRecord>, SyncError> {
        Ok(self.snapshot.all().await?)
    }
}
