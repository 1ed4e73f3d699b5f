//! # Observability & Tracing
//!
//! Store actors log every request with an `entity_type` field instead of a
//! module path, so the subscriber hides targets and uses the compact format.
//!
//! ```bash
//! RUST_LOG=info cargo run     # lifecycle + mutations
//! RUST_LOG=debug cargo run    # every request, with payloads
//! RUST_LOG=catalog_sync=debug,actor_store=info cargo run
//! ```
//!
//! Typical output at `info`:
//!
//! ```text
//! INFO Store started entity_type="BookRecord" key="books_cache" size=0
//! WARN list: remote unavailable, serving local snapshot error=...
//! INFO Inserted entity_type="PendingOperation" id=3f2c... size=1
//! INFO replay finished attempted=1 applied=1 failed=0
//! ```

/// Installs the global subscriber, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
