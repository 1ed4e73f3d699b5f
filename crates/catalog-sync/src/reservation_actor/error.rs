//! Error types for the reservation queue.

use crate::model::{BookId, ReservationId, ReservationState, UserId};
use actor_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReservationError {
    /// The user already holds a waiting or ready reservation for this book.
    #[error("User {user_id} already has an active reservation for book {book_id}")]
    AlreadyActive { user_id: UserId, book_id: BookId },

    #[error("Reservation {id} cannot go from {from} to {to}")]
    InvalidTransition {
        id: ReservationId,
        from: ReservationState,
        to: ReservationState,
    },

    #[error("Reservation not found: {0}")]
    NotFound(ReservationId),

    #[error("Reservation store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ReservationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Entity(inner) => match inner.downcast::<ReservationError>() {
                Ok(domain) => *domain,
                Err(inner) => ReservationError::Store(StoreError::Entity(inner)),
            },
            StoreError::NotFound(id) => ReservationError::NotFound(ReservationId(id)),
            other => ReservationError::Store(other),
        }
    }
}
