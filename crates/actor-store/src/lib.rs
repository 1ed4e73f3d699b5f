//! # Actor Store
//!
//! Persistence-backed collections, each owned by exactly one Tokio task.
//!
//! A [`StoreActor`] holds an ordered `Vec` of [`StoreEntity`] records and
//! answers [`StoreRequest`]s one at a time. Because only that task ever
//! touches the collection, a request such as "insert unless an equivalent
//! record exists" is atomic without any lock, and concurrent callers can never
//! interleave half-finished read-modify-write cycles.
//!
//! After every mutation the whole collection is written through a
//! [`Persistence`] adapter. The adapter contract is a plain key/value
//! load/save; there are no partial writes to get wrong.
//!
//! ## Layers
//!
//! 1. **Entity Layer** ([`StoreEntity`]) - record type, id, patch and action hooks
//! 2. **Runtime Layer** ([`StoreActor`]) - message processing and persistence
//! 3. **Interface Layer** ([`StoreClient`], [`StoreBacked`]) - type-safe access
//!
//! ## Example
//!
//! ```rust
//! use actor_store::{MemoryPersistence, StoreActor, StoreEntity};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Shelf { id: u32, label: String }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("duplicate shelf {0}")]
//! struct ShelfError(u32);
//!
//! impl StoreEntity for Shelf {
//!     type Id = u32;
//!     type Update = String;
//!     type Action = ();
//!     type ActionResult = ();
//!     type Error = ShelfError;
//!
//!     fn id(&self) -> &u32 { &self.id }
//!     fn check_insert(&self, existing: &[Self]) -> Result<(), ShelfError> {
//!         match existing.iter().any(|s| s.id == self.id) {
//!             true => Err(ShelfError(self.id)),
//!             false => Ok(()),
//!         }
//!     }
//!     fn on_update(&mut self, label: String) -> Result<(), ShelfError> {
//!         self.label = label;
//!         Ok(())
//!     }
//!     fn handle_action(&mut self, _: ()) -> Result<(), ShelfError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let persistence = Arc::new(MemoryPersistence::new());
//!     let (actor, client) = StoreActor::<Shelf>::open(persistence, "shelves", 8).unwrap();
//!     tokio::spawn(actor.run());
//!
//!     client.insert(Shelf { id: 1, label: "fiction".into() }).await.unwrap();
//!     assert!(client.insert(Shelf { id: 1, label: "again".into() }).await.is_err());
//!     let shelf = client.update(1, "poetry".into()).await.unwrap();
//!     assert_eq!(shelf.label, "poetry");
//! }
//! ```
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real [`StoreClient`] from scripted
//! expectations, for testing wrappers without spawning a store.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod persistence;
pub mod tracing;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use client_trait::StoreBacked;
pub use entity::StoreEntity;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence};
