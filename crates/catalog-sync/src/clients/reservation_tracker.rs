//! # Reservation Tracker
//!
//! The reservation queue's domain API. Wraps the reservation actor's
//! `StoreClient<ReservationEntry>` and publishes promotions through a
//! [`Notifier`].
//!
//! Queue positions are projections: every call that reports one reads the
//! current entries and sorts the waiting ones by reservation time.
use crate::model::{
    position_in_queue, waiting_queue, BookId, BookRecord, QueuedReservation, ReservationEntry,
    ReservationId, UserId,
};
use crate::notify::{Notifier, ReservationReady};
use crate::reservation_actor::{ReservationAction, ReservationError};
use actor_store::{StoreBacked, StoreClient};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct ReservationTracker {
    inner: StoreClient<ReservationEntry>,
    notifier: Notifier,
}

impl ReservationTracker {
    pub fn new(inner: StoreClient<ReservationEntry>, notifier: Notifier) -> Self {
        Self { inner, notifier }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}

#[async_trait]
impl StoreBacked<ReservationEntry> for ReservationTracker {
    type Error = ReservationError;

    fn inner(&self) -> &StoreClient<ReservationEntry> {
        &self.inner
    }
}

impl ReservationTracker {
    /// Puts `user_id` at the back of the queue for `book`.
    ///
    /// # Errors
    /// [`ReservationError::AlreadyActive`] if the user already has a waiting
    /// or ready entry for this book.
    #[instrument(skip(self, book), fields(book_id = %book.id))]
    pub async fn reserve(
        &self,
        user_id: UserId,
        book: &BookRecord,
    ) -> Result<QueuedReservation, ReservationError> {
        debug!("Sending request");
        let entry = ReservationEntry::waiting(user_id.clone(), book.id.clone(), book.summary(), Utc::now());
        self.inner.insert(entry.clone()).await?;

        let entries = self.inner.all().await?;
        let position = position_in_queue(&entries, &user_id, &book.id).unwrap_or(1);
        info!(reservation_id = %entry.id, position, "reserved");
        Ok(QueuedReservation { entry, position })
    }

    /// Promotes the longest-waiting entry for `book_id`, if any.
    ///
    /// If the chosen entry is cancelled before the promotion lands, the next
    /// candidate is tried. Returns the promoted entry.
    #[instrument(skip(self))]
    pub async fn on_book_returned(
        &self,
        book_id: BookId,
    ) -> Result<Option<ReservationEntry>, ReservationError> {
        loop {
            let entries = self.inner.all().await?;
            let Some(candidate) = waiting_queue(&entries, &book_id).first().map(|e| e.id.clone())
            else {
                debug!("no one waiting");
                return Ok(None);
            };

            let action = ReservationAction::Promote { at: Utc::now() };
            match self.inner.perform_action(candidate.clone(), action).await {
                Ok((promoted, _)) => {
                    info!(reservation_id = %promoted.id, user_id = %promoted.user_id, "promoted");
                    self.notifier.publish(ReservationReady {
                        book_title: promoted.book.title.clone(),
                        reservation: promoted.clone(),
                    });
                    return Ok(Some(promoted));
                }
                Err(e) => match ReservationError::from(e) {
                    ReservationError::InvalidTransition { .. } | ReservationError::NotFound(_) => {
                        warn!(reservation_id = %candidate, "candidate left the queue, retrying");
                    }
                    other => return Err(other),
                },
            }
        }
    }

    /// `waiting|ready -> cancelled`.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: ReservationId) -> Result<ReservationEntry, ReservationError> {
        debug!("Sending request");
        let (entry, previous) = self
            .inner
            .perform_action(id, ReservationAction::Cancel { at: Utc::now() })
            .await?;
        info!(%previous, "cancelled");
        Ok(entry)
    }

    /// `ready -> fulfilled`, once the reservation has become a loan.
    #[instrument(skip(self))]
    pub async fn fulfill(&self, id: ReservationId) -> Result<ReservationEntry, ReservationError> {
        debug!("Sending request");
        let (entry, _) = self
            .inner
            .perform_action(id, ReservationAction::Fulfill { at: Utc::now() })
            .await?;
        Ok(entry)
    }

    /// 1-based position of the user's waiting entry, or `None` if they are not waiting.
    #[instrument(skip(self))]
    pub async fn position_for(
        &self,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<Option<usize>, ReservationError> {
        let entries = self.inner.all().await?;
        Ok(position_in_queue(&entries, user_id, book_id))
    }

    pub async fn reservations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationEntry>, ReservationError> {
        let entries = self.inner.all().await?;
        Ok(entries
            .into_iter()
            .filter(|e| &e.user_id == user_id)
            .collect())
    }

    /// The waiting entries for `book_id`, earliest first, with positions.
    pub async fn queue_for_book(
        &self,
        book_id: &BookId,
    ) -> Result<Vec<QueuedReservation>, ReservationError> {
        let entries = self.inner.all().await?;
        Ok(waiting_queue(&entries, book_id)
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| QueuedReservation {
                entry: entry.clone(),
                position: idx + 1,
            })
            .collect())
    }
}
