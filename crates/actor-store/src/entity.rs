//! # StoreEntity Trait
//!
//! The contract every record kept in a [`StoreActor`](crate::StoreActor) must satisfy.
//! The actor owns an *ordered* collection of these records and persists the
//! whole collection after every mutation, so entities must round-trip through
//! serde.
//!
//! # Hooks
//! - [`StoreEntity::check_insert`] sees the current collection and may veto an insert.
//!   This is where collection-wide uniqueness rules live, because only the
//!   owning task can evaluate them without a race.
//! - [`StoreEntity::on_update`] applies a typed patch in place.
//! - [`StoreEntity::handle_action`] runs a domain-specific operation (a state
//!   transition, a retarget) and returns a typed result.
//!
//! Hooks run against a working copy. If a hook fails, or the collection cannot
//! be persisted afterwards, the in-memory state is left untouched.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};

pub trait StoreEntity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable identifier, unique within one collection.
    type Id: Eq + Clone + Send + Sync + Display + Debug;

    /// Patch accepted by [`StoreEntity::on_update`]. Use `()` when records are immutable.
    type Update: Send + Sync + Debug;

    /// Domain operations accepted by [`StoreEntity::handle_action`].
    type Action: Send + Sync + Debug;

    /// Result of a successful action.
    type ActionResult: Send + Sync + Debug;

    /// Error raised by the hooks. Boxed into [`StoreError::Entity`](crate::StoreError::Entity).
    type Error: std::error::Error + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Called before `self` is appended to `existing`.
    fn check_insert(&self, _existing: &[Self]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_update(&mut self, update: Self::Update) -> Result<(), Self::Error>;

    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}
