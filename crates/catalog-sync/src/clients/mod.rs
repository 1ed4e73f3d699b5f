//! Domain wrappers around the generic [`StoreClient`](actor_store::StoreClient)s.
//!
//! Each wrapper implements [`StoreBacked`](actor_store::StoreBacked) for the
//! standard reads and adds the operations its collection needs.

pub mod pending_log;
pub mod reservation_tracker;
pub mod snapshot_client;

pub use pending_log::PendingLog;
pub use reservation_tracker::ReservationTracker;
pub use snapshot_client::SnapshotClient;
