//! # Availability Probe
//!
//! A single bounded liveness check. Every failure mode, timeout included,
//! collapses to `false`.

use super::CatalogApi;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AvailabilityProbe {
    api: Arc<dyn CatalogApi>,
    timeout: Duration,
}

impl AvailabilityProbe {
    pub fn new(api: Arc<dyn CatalogApi>, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    pub async fn check_availability(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.api.health()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "probe failed");
                false
            }
            Err(_) => {
                debug!(timeout_ms = self.timeout.as_millis() as u64, "probe timed out");
                false
            }
        }
    }
}
