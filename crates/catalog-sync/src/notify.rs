//! # Notification Fan-out
//!
//! Announces `waiting -> ready` promotions. Each promotion is published once
//! on an in-process [`broadcast`] channel and, when the platform has granted
//! permission, shown as a user-visible notification.
//!
//! Delivery is fire-and-forget: nothing is queued or retried. A subscriber
//! that lags or is not listening simply misses the event and is expected to
//! re-query reservation state when it next mounts.

use crate::model::ReservationEntry;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Published when a reservation becomes ready for pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationReady {
    pub reservation: ReservationEntry,
    pub book_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// The user has not been asked yet. Treated as not granted.
    Default,
}

/// A host surface for user-visible notifications.
pub trait PlatformNotifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    fn show(&self, title: &str, body: &str);
}

/// Logs notifications instead of displaying them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl PlatformNotifier for TracingNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn show(&self, title: &str, body: &str) {
        info!(%title, %body, "notification");
    }
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<ReservationReady>,
    platform: Option<Arc<dyn PlatformNotifier>>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            platform: None,
        }
    }

    pub fn with_platform(mut self, platform: Arc<dyn PlatformNotifier>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReservationReady> {
        self.sender.subscribe()
    }

    /// Emits `event` to current subscribers and the platform. Never fails.
    pub fn publish(&self, event: ReservationReady) {
        if let Some(platform) = &self.platform {
            if platform.permission() == NotificationPermission::Granted {
                platform.show(
                    "Reservation ready",
                    &format!("\"{}\" is ready for pickup", event.book_title),
                );
            }
        }

        let id = event.reservation.id.clone();
        match self.sender.send(event) {
            Ok(receivers) => debug!(%id, receivers, "reservation ready published"),
            Err(_) => debug!(%id, "reservation ready published with no subscribers"),
        }
    }
}
