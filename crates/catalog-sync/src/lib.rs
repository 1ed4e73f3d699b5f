//! # Catalog Sync
//!
//! An offline-tolerant data layer between a library UI and its remote
//! catalog service, plus the reservation queue that reacts to returned books.
//!
//! - [`engine`] - local-first reads and writes with a replayable pending log
//! - [`remote`] - the catalog HTTP API and its availability probe
//! - [`clients`] - domain wrappers over the store actors, including the
//!   [`ReservationTracker`](clients::ReservationTracker)
//! - [`notify`] - fan-out of `waiting -> ready` promotions
//! - [`lifecycle`] - [`SyncSystem`](lifecycle::SyncSystem), which starts and stops it all
//!
//! Every persisted collection is owned by one
//! [`StoreActor`](actor_store::StoreActor); see the `actor-store` crate.

pub mod clients;
pub mod engine;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod pending_actor;
pub mod remote;
pub mod reservation_actor;
pub mod settings;
pub mod snapshot_actor;
