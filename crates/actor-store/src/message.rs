//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](crate::StoreClient) to its
//! [`StoreActor`](crate::StoreActor). Each carries a oneshot sender for the reply.

use crate::entity::StoreEntity;
use crate::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by store actors.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Internal message type sent to the actor.
///
/// Reads (`All`, `Get`) never touch persistence. Every other variant is a
/// read-modify-write of the whole collection followed by a save.
#[derive(Debug)]
pub enum StoreRequest<T: StoreEntity> {
    All {
        respond_to: Response<Vec<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    /// Append after `check_insert` approves.
    Insert {
        item: T,
        respond_to: Response<()>,
    },
    /// Overwrite the entry with id `replacing` (default: the item's own id) in
    /// place, or append when there is none.
    Upsert {
        item: T,
        replacing: Option<T::Id>,
        respond_to: Response<()>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Remove {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    RemoveMany {
        ids: Vec<T::Id>,
        respond_to: Response<usize>,
    },
    ReplaceAll {
        items: Vec<T>,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<(T, T::ActionResult)>,
    },
    Clear {
        respond_to: Response<usize>,
    },
}
