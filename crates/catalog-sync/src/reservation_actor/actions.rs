//! State transitions for a [`ReservationEntry`](crate::model::ReservationEntry).
//!
//! Each action carries the time to stamp so the entity stays clock-free.

use chrono::{DateTime, Utc};

/// Queue transitions. `waiting -> ready -> fulfilled`, `cancelled` from either active state.
#[derive(Debug, Clone)]
pub enum ReservationAction {
    /// `waiting -> ready`, on a returned copy.
    Promote { at: DateTime<Utc> },
    /// `ready -> fulfilled`, when the reservation becomes a loan.
    Fulfill { at: DateTime<Utc> },
    Cancel { at: DateTime<Utc> },
}
