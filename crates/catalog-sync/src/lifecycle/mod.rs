//! # System Lifecycle & Orchestration
//!
//! Opens the three store actors, spawns them, wires their clients into the
//! [`SyncEngine`](crate::engine::SyncEngine) and the
//! [`ReservationTracker`](crate::clients::ReservationTracker), and shuts
//! everything down in order.
//!
//! ```rust,ignore
//! let settings = Settings::load()?;
//! let system = SyncSystem::from_settings(&settings, None)?;
//!
//! let page = system.engine.list(BookFilters::default()).await?;
//! system.tracker.reserve(user_id, &page.items[0]).await?;
//!
//! system.shutdown().await;
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - the engine and tracker own the only senders
//! 2. **Actors detect closure** - `receiver.recv()` returns `None`
//! 3. **Await completion** - every actor task is joined
//!
//! Clones of the engine or tracker held elsewhere keep their actors alive,
//! so drop them before calling [`SyncSystem::shutdown`].

pub mod sync_system;

pub use sync_system::*;
