//! Pure data structures. The three persisted ones implement
//! [`StoreEntity`](actor_store::StoreEntity) in their actor modules.

pub mod book;
pub mod filters;
pub mod operation;
pub mod reservation;

pub use book::*;
pub use filters::*;
pub use operation::*;
pub use reservation::*;
