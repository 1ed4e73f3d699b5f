//! Error types for book records.

use crate::model::BookId;
use thiserror::Error;

/// Local invariant violations on a book record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BookError {
    /// `available_copies` would exceed `total_copies`.
    #[error("Copy counts out of range: {available} available of {total} total")]
    CopyCountsOutOfRange { total: u32, available: u32 },

    #[error("Book {0} is already in the snapshot")]
    DuplicateId(BookId),
}
