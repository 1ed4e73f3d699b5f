//! [`StoreEntity`] implementation for [`PendingOperation`].
//!
//! Operations are immutable once queued except for one patch: after a
//! provisional create is confirmed, later updates aimed at the provisional id
//! are pointed at the server id.

use crate::model::{BookId, OperationId, OperationKind, PendingOperation};
use actor_store::StoreEntity;
use std::convert::Infallible;

#[derive(Debug, Clone)]
pub enum OperationUpdate {
    /// Point an `Update` at a new book id. Creates are left alone.
    Retarget(BookId),
}

impl StoreEntity for PendingOperation {
    type Id = OperationId;
    type Update = OperationUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Error = Infallible;

    fn id(&self) -> &OperationId {
        &self.id
    }

    fn on_update(&mut self, update: OperationUpdate) -> Result<(), Infallible> {
        match (update, &mut self.kind) {
            (OperationUpdate::Retarget(to), OperationKind::Update { id, .. }) => *id = to,
            (OperationUpdate::Retarget(_), OperationKind::Create { .. }) => {}
        }
        Ok(())
    }

    fn handle_action(&mut self, action: Infallible) -> Result<(), Infallible> {
        match action {}
    }
}
