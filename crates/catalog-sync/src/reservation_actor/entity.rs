//! [`StoreEntity`] implementation for [`ReservationEntry`].
//!
//! The uniqueness rule (one active entry per user and book) is checked in
//! `check_insert`, inside the owning actor, so two concurrent `reserve` calls
//! cannot both pass it.

use super::actions::ReservationAction;
use super::error::ReservationError;
use crate::model::{ReservationEntry, ReservationId, ReservationState};
use actor_store::StoreEntity;
use std::convert::Infallible;

impl StoreEntity for ReservationEntry {
    type Id = ReservationId;
    type Update = Infallible;
    type Action = ReservationAction;
    /// The state before the transition.
    type ActionResult = ReservationState;
    type Error = ReservationError;

    fn id(&self) -> &ReservationId {
        &self.id
    }

    fn check_insert(&self, existing: &[Self]) -> Result<(), ReservationError> {
        if existing
            .iter()
            .any(|e| e.is_active_for(&self.user_id, &self.book_id))
        {
            return Err(ReservationError::AlreadyActive {
                user_id: self.user_id.clone(),
                book_id: self.book_id.clone(),
            });
        }
        Ok(())
    }

    fn on_update(&mut self, update: Infallible) -> Result<(), ReservationError> {
        match update {}
    }

    fn handle_action(&mut self, action: ReservationAction) -> Result<ReservationState, ReservationError> {
        let next = match &action {
            ReservationAction::Promote { .. } => ReservationState::Ready,
            ReservationAction::Fulfill { .. } => ReservationState::Fulfilled,
            ReservationAction::Cancel { .. } => ReservationState::Cancelled,
        };
        let previous = self.state;
        if !previous.can_transition_to(next) {
            return Err(ReservationError::InvalidTransition {
                id: self.id.clone(),
                from: previous,
                to: next,
            });
        }

        match action {
            ReservationAction::Promote { at } => self.promoted_at = Some(at),
            ReservationAction::Fulfill { at } => self.fulfilled_at = Some(at),
            ReservationAction::Cancel { at } => self.cancelled_at = Some(at),
        }
        self.state = next;
        Ok(previous)
    }
}
