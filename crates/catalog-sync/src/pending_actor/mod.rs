//! # Pending-Operation Actor
//!
//! Owns the log of deferred creates and updates, persisted under
//! [`PENDING_KEY`] in enqueue order. Replay reads the log front to back and
//! removes exactly the operations the remote service accepted, by id, so
//! anything enqueued while a replay is in flight survives it.

pub mod entity;

pub use entity::OperationUpdate;

use crate::model::PendingOperation;
use actor_store::{Persistence, StoreActor, StoreClient, StoreError};
use std::sync::Arc;

pub const PENDING_KEY: &str = "books_pending_sync";

pub fn new(
    persistence: Arc<dyn Persistence>,
    buffer: usize,
) -> Result<(StoreActor<PendingOperation>, StoreClient<PendingOperation>), StoreError> {
    StoreActor::open(persistence, PENDING_KEY, buffer)
}
