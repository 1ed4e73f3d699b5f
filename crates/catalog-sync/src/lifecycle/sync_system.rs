use crate::clients::{PendingLog, ReservationTracker, SnapshotClient};
use crate::engine::SyncEngine;
use crate::notify::{Notifier, PlatformNotifier};
use crate::remote::probe::DEFAULT_PROBE_TIMEOUT;
use crate::remote::{AvailabilityProbe, CatalogApi, HttpCatalogApi};
use crate::settings::{Settings, StorageBackend};
use crate::{pending_actor, reservation_actor, snapshot_actor};
use actor_store::{JsonFilePersistence, MemoryPersistence, Persistence, StoreError};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Tunables for [`SyncSystem::start`].
#[derive(Clone)]
pub struct SystemOptions {
    pub probe_timeout: Duration,
    pub channel_buffer: usize,
    pub notification_capacity: usize,
    pub platform: Option<Arc<dyn PlatformNotifier>>,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            channel_buffer: 32,
            notification_capacity: 16,
            platform: None,
        }
    }
}

/// The running data layer.
///
/// # Architecture
///
/// - **Snapshot actor**: the local copy of the catalog
/// - **Pending actor**: the log of deferred writes
/// - **Reservation actor**: every reservation entry
///
/// Each collection is owned by exactly one task. The engine and the tracker
/// only hold clients, so every read-modify-write of a persisted collection is
/// serialized by its actor.
pub struct SyncSystem {
    pub engine: SyncEngine,
    pub tracker: ReservationTracker,
    pub notifier: Notifier,
    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl SyncSystem {
    /// Opens and spawns the store actors. Must be called inside a Tokio runtime.
    pub fn start(
        api: Arc<dyn CatalogApi>,
        persistence: Arc<dyn Persistence>,
        options: SystemOptions,
    ) -> Result<Self, StoreError> {
        // 1. Open actors; corrupt persisted state fails here, before anything runs
        let (snapshot_actor, snapshot_client) =
            snapshot_actor::new(persistence.clone(), options.channel_buffer)?;
        let (pending_actor, pending_client) =
            pending_actor::new(persistence.clone(), options.channel_buffer)?;
        let (reservation_actor, reservation_client) =
            reservation_actor::new(persistence, options.channel_buffer)?;

        // 2. Start actors
        let handles = vec![
            tokio::spawn(snapshot_actor.run()),
            tokio::spawn(pending_actor.run()),
            tokio::spawn(reservation_actor.run()),
        ];

        // 3. Wire clients
        let mut notifier = Notifier::new(options.notification_capacity);
        if let Some(platform) = options.platform {
            notifier = notifier.with_platform(platform);
        }
        let probe = AvailabilityProbe::new(api.clone(), options.probe_timeout);
        let engine = SyncEngine::new(
            api,
            probe,
            SnapshotClient::new(snapshot_client),
            PendingLog::new(pending_client),
        );
        let tracker = ReservationTracker::new(reservation_client, notifier.clone());

        info!("sync system started");
        Ok(Self {
            engine,
            tracker,
            notifier,
            handles,
        })
    }

    /// Builds the HTTP client and persistence backend described by `settings`.
    pub fn from_settings(
        settings: &Settings,
        platform: Option<Arc<dyn PlatformNotifier>>,
    ) -> anyhow::Result<Self> {
        let api = HttpCatalogApi::new(&settings.remote.base_url, settings.remote.request_timeout())
            .context("failed to build remote catalog client")?;

        let persistence: Arc<dyn Persistence> = match settings.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryPersistence::new()),
            StorageBackend::File => Arc::new(
                JsonFilePersistence::open(&settings.storage.data_dir).with_context(|| {
                    format!(
                        "failed to open data directory {}",
                        settings.storage.data_dir.display()
                    )
                })?,
            ),
        };

        let options = SystemOptions {
            probe_timeout: settings.remote.probe_timeout(),
            channel_buffer: settings.runtime.channel_buffer,
            notification_capacity: settings.runtime.notification_capacity,
            platform,
        };
        Self::start(Arc::new(api), persistence, options).context("failed to open local stores")
    }

    /// Drops every client and waits for the actors to finish.
    pub async fn shutdown(self) {
        drop(self.engine);
        drop(self.tracker);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "actor task failed during shutdown");
            }
        }
        info!("sync system stopped");
    }
}
