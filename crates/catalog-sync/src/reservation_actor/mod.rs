//! # Reservation Actor
//!
//! Owns every [`ReservationEntry`] across all books, persisted under
//! [`RESERVATIONS_KEY`].
//!
//! ## Structure
//!
//! - [`entity`] - [`StoreEntity`](actor_store::StoreEntity) implementation with the
//!   one-active-entry rule and the transition table
//! - [`actions`] - [`ReservationAction`] (`Promote`, `Fulfill`, `Cancel`)
//! - [`error`] - [`ReservationError`]
//! - [`new()`] - Factory that opens the actor and its client
//!
//! The domain API lives on
//! [`ReservationTracker`](crate::clients::ReservationTracker).

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::ReservationEntry;
use actor_store::{Persistence, StoreActor, StoreClient, StoreError};
use std::sync::Arc;

pub const RESERVATIONS_KEY: &str = "reservations";

pub fn new(
    persistence: Arc<dyn Persistence>,
    buffer: usize,
) -> Result<(StoreActor<ReservationEntry>, StoreClient<ReservationEntry>), StoreError> {
    StoreActor::open(persistence, RESERVATIONS_KEY, buffer)
}
