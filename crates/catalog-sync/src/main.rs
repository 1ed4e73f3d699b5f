//! # Catalog Sync Demo
//!
//! Starts the data layer from `config/catalog-sync.toml` and the
//! `CATALOG_SYNC__*` environment, then walks through one session:
//!
//! 1. List the catalog (remote, or the local snapshot when offline).
//! 2. Create a book, which is queued if the service is unreachable.
//! 3. Queue two readers for the book and promote one on return.
//! 4. Replay whatever is still pending and shut down.
//!
//! ```bash
//! RUST_LOG=info cargo run -p catalog-sync
//! CATALOG_SYNC__STORAGE__BACKEND=memory RUST_LOG=debug cargo run -p catalog-sync
//! ```

use actor_store::tracing::setup_tracing;
use anyhow::Context;
use catalog_sync::lifecycle::SyncSystem;
use catalog_sync::model::{BookFilters, BookInput, UserId};
use catalog_sync::notify::TracingNotifier;
use catalog_sync::settings::Settings;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let settings = Settings::load()?;
    info!(base_url = %settings.remote.base_url, backend = ?settings.storage.backend, "Starting catalog sync");

    let system = SyncSystem::from_settings(&settings, Some(Arc::new(TracingNotifier)))?;
    let mut ready = system.notifier.subscribe();

    let span = tracing::info_span!("catalog_listing");
    let page = async {
        info!(online = system.engine.is_online().await, "Listing catalog");
        system.engine.list(BookFilters::default()).await
    }
    .instrument(span)
    .await
    .context("failed to list catalog")?;
    info!(total = page.total, provenance = ?page.provenance, "Catalog listed");

    let mut input = BookInput::new("The Left Hand of Darkness", "Ursula K. Le Guin", 1);
    input.category = "Fiction".to_string();
    input.available_copies = 0;
    let written = system
        .engine
        .create(input)
        .instrument(tracing::info_span!("book_creation"))
        .await
        .context("failed to create book")?;
    info!(id = %written.item.id, confirmation = ?written.confirmation, "Book written");

    let span = tracing::info_span!("reservation_queue");
    let queue = async {
        let first = system.tracker.reserve(UserId::from("alice"), &written.item).await?;
        let second = system.tracker.reserve(UserId::from("bob"), &written.item).await?;
        info!(first = first.position, second = second.position, "Readers queued");
        system.tracker.on_book_returned(written.item.id.clone()).await
    }
    .instrument(span)
    .await;

    match queue {
        Ok(Some(promoted)) => info!(user_id = %promoted.user_id, "Reservation promoted"),
        Ok(None) => info!("Nobody was waiting"),
        Err(e) => error!(error = %e, "Reservation queue failed"),
    }
    if let Ok(event) = ready.try_recv() {
        info!(title = %event.book_title, "Received ready event");
    }

    match system.engine.replay().await {
        Ok(report) => info!(
            attempted = report.attempted,
            applied = report.applied,
            failed = report.failed,
            skipped = report.skipped,
            "Replay finished"
        ),
        Err(e) => error!(error = %e, "Replay failed"),
    }
    info!(pending = system.engine.pending_count().await?, "Pending operations");

    system.shutdown().await;
    info!("Application completed successfully");
    Ok(())
}
