//! # Snapshot Actor
//!
//! Owns the local snapshot: the ordered collection of [`BookRecord`]s this
//! client last saw, persisted under [`SNAPSHOT_KEY`].
//!
//! The snapshot is replaced wholesale after a successful remote list and
//! patched in place by optimistic writes. Reads while offline are answered
//! from it alone.
//!
//! ## Structure
//!
//! - [`entity`] - [`StoreEntity`](actor_store::StoreEntity) implementation for [`BookRecord`]
//! - [`error`] - [`BookError`] for copy-count violations
//! - [`new()`] - Factory that opens the actor and its client

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::BookRecord;
use actor_store::{Persistence, StoreActor, StoreClient, StoreError};
use std::sync::Arc;

pub const SNAPSHOT_KEY: &str = "books_cache";

/// Opens the snapshot actor over `persistence`.
pub fn new(
    persistence: Arc<dyn Persistence>,
    buffer: usize,
) -> Result<(StoreActor<BookRecord>, StoreClient<BookRecord>), StoreError> {
    StoreActor::open(persistence, SNAPSHOT_KEY, buffer)
}
