//! Errors surfaced by the synchronization engine.
//!
//! Transient remote failures on reads, creates and updates never reach this
//! type; they are absorbed by the offline path.

use crate::model::BookId;
use crate::remote::RemoteError;
use crate::snapshot_actor::BookError;
use actor_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote refusal, or any remote failure on delete.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A local invariant violation on a book record.
    #[error(transparent)]
    Book(BookError),

    /// An offline update or read targeted an id the snapshot does not hold.
    #[error("Book {0} is not in the local snapshot")]
    NotInSnapshot(BookId),

    #[error("Local store error: {0}")]
    Store(StoreError),
}

impl From<BookError> for SyncError {
    fn from(e: BookError) -> Self {
        SyncError::Book(e)
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Entity(inner) => match inner.downcast::<BookError>() {
                Ok(book) => SyncError::Book(*book),
                Err(inner) => SyncError::Store(StoreError::Entity(inner)),
            },
            other => SyncError::Store(other),
        }
    }
}

impl SyncError {
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote(_))
    }
}
