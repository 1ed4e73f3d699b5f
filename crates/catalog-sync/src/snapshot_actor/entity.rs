//! [`StoreEntity`] implementation for [`BookRecord`], the local snapshot row.

use super::error::BookError;
use crate::model::{BookId, BookPatch, BookRecord};
use actor_store::StoreEntity;
use std::convert::Infallible;

impl StoreEntity for BookRecord {
    type Id = BookId;
    type Update = BookPatch;
    type Action = Infallible;
    type ActionResult = ();
    type Error = BookError;

    fn id(&self) -> &BookId {
        &self.id
    }

    fn check_insert(&self, existing: &[Self]) -> Result<(), BookError> {
        self.validate()?;
        if existing.iter().any(|b| b.id == self.id) {
            return Err(BookError::DuplicateId(self.id.clone()));
        }
        Ok(())
    }

    /// Applies a patch offline. Rejects results with more available than total copies.
    fn on_update(&mut self, patch: BookPatch) -> Result<(), BookError> {
        patch.apply(self, chrono::Utc::now())
    }

    fn handle_action(&mut self, action: Infallible) -> Result<(), BookError> {
        match action {}
    }
}
