/// One user's place in line for one book.
///
/// # Store
/// Implements [`StoreEntity`](actor_store::StoreEntity) in
/// [`crate::reservation_actor`]. Queue position is never stored: it is
/// recomputed from `reserved_at` whenever it is asked for (see
/// [`waiting_queue`]), so cancelling an earlier entry can never leave a stale
/// number behind.
use crate::model::{BookId, BookSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub String);

impl ReservationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReservationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Waiting,
    Ready,
    Fulfilled,
    Cancelled,
}

impl ReservationState {
    /// Waiting or ready. At most one active entry per (user, book).
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationState::Waiting | ReservationState::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn can_transition_to(&self, next: ReservationState) -> bool {
        use ReservationState::*;
        matches!(
            (self, next),
            (Waiting, Ready) | (Ready, Fulfilled) | (Waiting, Cancelled) | (Ready, Cancelled)
        )
    }
}

impl Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReservationState::Waiting => "waiting",
            ReservationState::Ready => "ready",
            ReservationState::Fulfilled => "fulfilled",
            ReservationState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationEntry {
    pub id: ReservationId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub book: BookSummary,
    pub state: ReservationState,
    pub reserved_at: DateTime<Utc>,
    #[serde(default)]
    pub promoted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fulfilled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl ReservationEntry {
    pub fn waiting(user_id: UserId, book_id: BookId, book: BookSummary, at: DateTime<Utc>) -> Self {
        Self {
            id: ReservationId::generate(),
            book_id,
            user_id,
            book,
            state: ReservationState::Waiting,
            reserved_at: at,
            promoted_at: None,
            fulfilled_at: None,
            cancelled_at: None,
        }
    }

    pub fn is_active_for(&self, user_id: &UserId, book_id: &BookId) -> bool {
        self.state.is_active() && &self.user_id == user_id && &self.book_id == book_id
    }
}

/// A waiting entry with its derived 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedReservation {
    pub entry: ReservationEntry,
    pub position: usize,
}

/// Waiting entries for `book_id`, earliest first.
///
/// The sort is stable, so entries with equal timestamps keep insertion order.
pub fn waiting_queue<'a>(entries: &'a [ReservationEntry], book_id: &BookId) -> Vec<&'a ReservationEntry> {
    let mut queue: Vec<_> = entries
        .iter()
        .filter(|e| e.state == ReservationState::Waiting && &e.book_id == book_id)
        .collect();
    queue.sort_by_key(|e| e.reserved_at);
    queue
}

pub fn position_in_queue(entries: &[ReservationEntry], user_id: &UserId, book_id: &BookId) -> Option<usize> {
    waiting_queue(entries, book_id)
        .iter()
        .position(|e| &e.user_id == user_id)
        .map(|idx| idx + 1)
}
