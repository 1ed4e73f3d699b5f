mod support;

use actor_store::{MemoryPersistence, StoreError};
use catalog_sync::engine::{SyncError, FALLBACK_CATEGORIES};
use catalog_sync::model::{
    BookFilters, BookId, BookInput, BookPatch, Confirmation, OperationKind, Provenance,
};
use catalog_sync::remote::RemoteError;
use std::sync::Arc;
use support::{book, start, start_flaky, start_with, Call, FakeCatalog};

fn assert_availability_derived(records: &[catalog_sync::model::BookRecord]) {
    for record in records {
        assert_eq!(
            record.is_available,
            record.available_copies > 0,
            "is_available drifted for {}",
            record.id
        );
        assert!(record.available_copies <= record.total_copies);
    }
}

#[tokio::test]
async fn successful_list_replaces_the_snapshot() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3), book("2", "Emma", 1, 0)]);
    let persistence = Arc::new(MemoryPersistence::new());
    let stale = book("99", "Withdrawn Title", 1, 1);
    let system = start_with(remote.clone(), persistence, &[stale]);

    let page = system.engine.list(BookFilters::default()).await.unwrap();
    assert_eq!(page.provenance, Provenance::Remote);
    assert_eq!(page.total, 2);

    let snapshot = system.engine.snapshot().await.unwrap();
    assert_eq!(snapshot, page.items);
    assert!(snapshot.iter().all(|b| b.id.as_str() != "99"));

    system.shutdown().await;
}

#[tokio::test]
async fn offline_list_serves_the_snapshot_with_the_same_paging() {
    let books: Vec<_> = (1..=12)
        .map(|n| book(&n.to_string(), &format!("Title {n:02}"), 2, n % 2))
        .collect();
    let remote = FakeCatalog::new(books);
    let (system, _) = start(remote.clone());

    let online = system
        .engine
        .list(BookFilters::default().page(2, 5))
        .await
        .unwrap();
    // Only the listed page reaches the snapshot; list the whole catalog first.
    system
        .engine
        .list(BookFilters::default().page(1, 50))
        .await
        .unwrap();

    remote.set_online(false);
    let offline = system
        .engine
        .list(BookFilters::default().page(2, 5))
        .await
        .unwrap();

    assert_eq!(offline.provenance, Provenance::LocalSnapshot);
    assert!(offline.provenance.is_offline());
    assert_eq!(offline.items, online.items);
    assert_eq!(
        (offline.total, offline.page, offline.per_page, offline.last_page),
        (online.total, online.page, online.per_page, online.last_page)
    );
    assert_eq!(offline.last_page, 3);

    let available = system
        .engine
        .list(BookFilters::default().available(true).page(1, 50))
        .await
        .unwrap();
    assert_eq!(available.total, 6);

    system.shutdown().await;
}

#[tokio::test]
async fn offline_update_is_applied_locally_and_replayed() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(remote.clone(), persistence, &[book("1", "Dune", 5, 3)]);

    remote.set_online(false);
    let written = system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(0))
        .await
        .unwrap();
    assert_eq!(written.confirmation, Confirmation::Unconfirmed);
    assert_eq!(written.item.available_copies, 0);
    assert!(!written.item.is_available);

    let snapshot = system.engine.snapshot().await.unwrap();
    assert_eq!(snapshot[0].available_copies, 0);
    assert!(!snapshot[0].is_available);

    let pending = system.engine.pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(matches!(&pending[0].kind, OperationKind::Update { id, .. } if id.as_str() == "1"));

    remote.set_online(true);
    let report = system.engine.replay().await.unwrap();
    assert_eq!((report.attempted, report.applied, report.failed), (1, 1, 0));
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    let confirmed = remote.book("1").unwrap();
    assert_eq!(confirmed.available_copies, 0);
    assert!(!confirmed.is_available);

    system.shutdown().await;
}

#[tokio::test]
async fn no_write_is_lost_across_an_outage() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3), book("2", "Emma", 2, 2)]);
    let (system, _) = start(remote.clone());
    system.engine.list(BookFilters::default()).await.unwrap();

    remote.set_online(false);
    let mut issued = 0;
    for title in ["Beloved", "Ubik", "Solaris"] {
        let written = system
            .engine
            .create(BookInput::new(title, "Anon", 1))
            .await
            .unwrap();
        assert!(!written.is_confirmed());
        assert!(written.item.id.is_provisional());
        issued += 1;
    }
    system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(1))
        .await
        .unwrap();
    system
        .engine
        .update(BookId::from("2"), BookPatch::available_copies(0))
        .await
        .unwrap();
    issued += 2;
    assert_eq!(system.engine.pending_count().await.unwrap(), issued);
    assert_availability_derived(&system.engine.snapshot().await.unwrap());

    // The first queued create is refused once the service is back.
    remote.set_online(true);
    let calls_before = remote.calls().len();
    remote.reject_next(RemoteError::from_status(503, "warming up"));
    let report = system.engine.replay().await.unwrap();
    let still_queued = system.engine.pending_count().await.unwrap();

    assert_eq!(report.attempted, issued);
    assert_eq!(report.applied + still_queued, issued);
    assert_eq!(report.failed, still_queued);
    assert_eq!(still_queued, 1);
    assert!(remote.calls().len() > calls_before);

    let report = system.engine.replay().await.unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);
    assert_eq!(remote.books().len(), 5);

    let snapshot = system.engine.snapshot().await.unwrap();
    assert!(snapshot.iter().all(|b| !b.id.is_provisional()));
    assert_availability_derived(&snapshot);

    system.shutdown().await;
}

#[tokio::test]
async fn updates_of_a_provisional_book_follow_its_server_id() {
    let remote = FakeCatalog::new(Vec::new());
    let (system, _) = start(remote.clone());

    remote.set_online(false);
    let created = system
        .engine
        .create(BookInput::new("Kindred", "Octavia Butler", 3))
        .await
        .unwrap()
        .item;
    let patched = system
        .engine
        .update(created.id.clone(), BookPatch::available_copies(1))
        .await
        .unwrap();
    assert_eq!(patched.item.id, created.id);
    assert_eq!(system.engine.pending_count().await.unwrap(), 2);

    remote.set_online(true);
    let report = system.engine.replay().await.unwrap();
    assert_eq!(report.applied, 2);

    let server = remote.books();
    assert_eq!(server.len(), 1);
    assert_eq!(server[0].available_copies, 1);
    assert!(remote.calls().contains(&Call::Update(server[0].id.clone())));

    let snapshot = system.engine.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, server[0].id);
    assert_eq!(snapshot[0].available_copies, 1);

    system.shutdown().await;
}

#[tokio::test]
async fn provisional_updates_wait_for_their_create() {
    let remote = FakeCatalog::new(Vec::new());
    let (system, _) = start(remote.clone());

    remote.set_online(false);
    let created = system
        .engine
        .create(BookInput::new("Kindred", "Octavia Butler", 3))
        .await
        .unwrap()
        .item;
    system
        .engine
        .update(created.id.clone(), BookPatch::available_copies(2))
        .await
        .unwrap();

    remote.set_online(true);
    remote.reject_next(RemoteError::from_status(500, "boom"));
    let report = system.engine.replay().await.unwrap();
    assert_eq!((report.applied, report.failed), (0, 2));
    assert!(!remote
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Update(_))));

    let report = system.engine.replay().await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(remote.books()[0].available_copies, 2);

    system.shutdown().await;
}

#[tokio::test]
async fn lost_create_responses_do_not_duplicate_books() {
    let remote = FakeCatalog::new(Vec::new());
    let (system, _) = start(remote.clone());

    remote.lose_next_create_response();
    let written = system
        .engine
        .create(BookInput::new("Ubik", "Philip K. Dick", 1))
        .await
        .unwrap();
    assert!(!written.is_confirmed());
    assert_eq!(remote.books().len(), 1);

    system.engine.replay().await.unwrap();
    assert_eq!(remote.books().len(), 1);
    assert_eq!(remote.create_calls(), 2);

    let keys: Vec<_> = remote
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Create { key } => Some(key),
            _ => None,
        })
        .collect();
    assert_eq!(keys[0], keys[1]);

    system.shutdown().await;
}

#[tokio::test]
async fn concurrent_replays_send_each_operation_once() {
    let remote = FakeCatalog::new(Vec::new());
    let (system, _) = start(remote.clone());

    remote.set_online(false);
    system
        .engine
        .create(BookInput::new("Ubik", "Philip K. Dick", 1))
        .await
        .unwrap();
    remote.set_online(true);

    let (a, b) = tokio::join!(system.engine.replay(), system.engine.replay());
    let applied = a.unwrap().applied + b.unwrap().applied;
    assert_eq!(applied, 1);
    // One create while offline, one during replay.
    assert_eq!(remote.create_calls(), 2);
    assert_eq!(remote.books().len(), 1);

    system.shutdown().await;
}

#[tokio::test]
async fn replay_is_skipped_while_offline() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(remote.clone(), persistence, &[book("1", "Dune", 5, 3)]);

    let empty = system.engine.replay().await.unwrap();
    assert_eq!(empty.attempted, 0);
    assert!(!empty.skipped);
    assert!(remote.calls().is_empty());

    remote.set_online(false);
    system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(2))
        .await
        .unwrap();
    let report = system.engine.replay().await.unwrap();
    assert!(report.skipped);
    assert_eq!(report.attempted, 0);
    assert_eq!(system.engine.pending_count().await.unwrap(), 1);
    assert!(!system.engine.is_online().await);

    system.shutdown().await;
}

#[tokio::test]
async fn delete_failures_are_never_queued() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(remote.clone(), persistence.clone(), &[book("1", "Dune", 5, 3)]);
    let log_before = persistence.raw("books_pending_sync");

    remote.set_online(false);
    let err = system.engine.delete(BookId::from("1")).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::Unavailable(_))));
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);
    assert_eq!(persistence.raw("books_pending_sync"), log_before);
    assert_eq!(system.engine.snapshot().await.unwrap().len(), 1);

    remote.set_online(true);
    remote.reject_next(RemoteError::from_status(409, "book has active loans"));
    let err = system.engine.delete(BookId::from("1")).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::Rejected { status: 409, .. })));
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    system.engine.delete(BookId::from("1")).await.unwrap();
    assert!(system.engine.snapshot().await.unwrap().is_empty());
    assert!(remote.books().is_empty());

    system.shutdown().await;
}

#[tokio::test]
async fn domain_errors_are_surfaced_not_queued() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(remote.clone(), persistence, &[book("1", "Dune", 5, 3)]);

    remote.reject_next(RemoteError::from_status(422, "isbn already registered"));
    let err = system
        .engine
        .create(BookInput::new("Dune", "Herbert", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::Rejected { status: 422, .. })));

    let err = system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(9))
        .await
        .unwrap_err();
    assert!(err.is_remote());

    assert_eq!(system.engine.pending_count().await.unwrap(), 0);
    assert_eq!(system.engine.snapshot().await.unwrap()[0].available_copies, 3);

    system.shutdown().await;
}

#[tokio::test]
async fn local_invariant_violations_are_distinct_errors() {
    let remote = FakeCatalog::new(Vec::new());
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(remote.clone(), persistence, &[book("1", "Dune", 5, 3)]);

    let mut input = BookInput::new("Dune", "Herbert", 1);
    input.available_copies = 2;
    let err = system.engine.create(input).await.unwrap_err();
    assert!(matches!(err, SyncError::Book(_)));
    assert!(remote.calls().is_empty());

    remote.set_online(false);
    let err = system
        .engine
        .update(BookId::from("missing"), BookPatch::available_copies(0))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotInSnapshot(id) if id.as_str() == "missing"));

    let err = system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(6))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Book(_)));
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    system.shutdown().await;
}

#[tokio::test]
async fn get_falls_back_only_when_unreachable() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let (system, _) = start(remote.clone());

    let fetched = system.engine.get(BookId::from("1")).await.unwrap();
    assert_eq!(fetched.provenance, Provenance::Remote);

    let err = system.engine.get(BookId::from("404")).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(e) if e.is_not_found()));

    remote.set_online(false);
    let cached = system.engine.get(BookId::from("1")).await.unwrap();
    assert_eq!(cached.provenance, Provenance::LocalSnapshot);
    assert_eq!(cached.item.title, "Dune");

    let err = system.engine.get(BookId::from("2")).await.unwrap_err();
    assert!(matches!(err, SyncError::NotInSnapshot(_)));

    system.shutdown().await;
}

#[tokio::test]
async fn categories_fall_back_to_defaults() {
    let mut science = book("2", "Cosmos", 1, 1);
    science.category = "Science".into();
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3), science]);
    let (system, _) = start(remote.clone());

    let online: Vec<_> = system.engine.categories().await.into_iter().collect();
    assert_eq!(online, vec!["Fiction".to_string(), "Science".to_string()]);

    remote.set_online(false);
    let offline = system.engine.categories().await;
    assert_eq!(offline.len(), FALLBACK_CATEGORIES.len());
    assert!(offline.contains("Children"));

    system.shutdown().await;
}

#[tokio::test]
async fn force_sync_and_manual_clear() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3), book("2", "Emma", 1, 1)]);
    let (system, _) = start(remote.clone());

    remote.set_online(false);
    system
        .engine
        .create(BookInput::new("Ubik", "Dick", 1))
        .await
        .unwrap();
    assert!(system.engine.force_sync().await.is_err());

    remote.set_online(true);
    let report = system.engine.force_sync().await.unwrap();
    assert_eq!(report.applied, 1);
    let snapshot = system.engine.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 3);

    remote.set_online(false);
    system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(0))
        .await
        .unwrap();
    assert_eq!(system.engine.clear_pending().await.unwrap(), 1);
    assert!(system.engine.pending().await.unwrap().is_empty());

    system.shutdown().await;
}

#[tokio::test]
async fn queued_writes_survive_a_restart() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(remote.clone(), persistence.clone(), &[book("1", "Dune", 5, 3)]);

    remote.set_online(false);
    system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(1))
        .await
        .unwrap();
    system.shutdown().await;

    let system = start_with(remote.clone(), persistence, &[]);
    assert_eq!(system.engine.pending_count().await.unwrap(), 1);
    assert_eq!(system.engine.snapshot().await.unwrap()[0].available_copies, 1);

    remote.set_online(true);
    let page = system.engine.list(BookFilters::default()).await.unwrap();
    assert_eq!(page.items[0].available_copies, 1);
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    system.shutdown().await;
}

#[tokio::test]
async fn offline_writes_that_cannot_be_queued_leave_the_snapshot_alone() {
    let remote = FakeCatalog::new(vec![book("1", "Dune", 5, 3)]);
    let (system, persistence) = start_flaky(remote.clone(), &[book("1", "Dune", 5, 3)]);

    remote.set_online(false);
    persistence.fail_saves("books_pending_sync");

    let err = system
        .engine
        .update(BookId::from("1"), BookPatch::available_copies(0))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Store(StoreError::Persistence { .. })));

    let err = system
        .engine
        .create(BookInput::new("Ubik", "Philip K. Dick", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Store(StoreError::Persistence { .. })));

    let snapshot = system.engine.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].available_copies, 3);
    assert!(snapshot[0].is_available);
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    system.shutdown().await;
}

#[tokio::test]
async fn create_stays_queued_until_its_updates_are_retargeted() {
    let remote = FakeCatalog::new(Vec::new());
    let (system, persistence) = start_flaky(remote.clone(), &[]);

    remote.set_online(false);
    let created = system
        .engine
        .create(BookInput::new("Kindred", "Octavia Butler", 3))
        .await
        .unwrap()
        .item;
    system
        .engine
        .update(created.id.clone(), BookPatch::available_copies(1))
        .await
        .unwrap();

    remote.set_online(true);
    persistence.fail_saves("books_pending_sync");
    let report = system.engine.replay().await.unwrap();
    assert_eq!((report.attempted, report.applied, report.failed), (2, 0, 2));
    assert_eq!(system.engine.pending_count().await.unwrap(), 2);

    persistence.heal();
    let report = system.engine.replay().await.unwrap();
    assert_eq!((report.applied, report.failed), (2, 0));
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    let server = remote.books();
    assert_eq!(server.len(), 1);
    assert_eq!(server[0].available_copies, 1);
    // Offline attempt, then once per pass under the same key.
    assert_eq!(remote.create_calls(), 3);

    system.shutdown().await;
}

#[tokio::test]
async fn updates_to_a_confirmed_provisional_id_are_not_queued() {
    let remote = FakeCatalog::new(Vec::new());
    let (system, _) = start(remote.clone());

    remote.set_online(false);
    let created = system
        .engine
        .create(BookInput::new("Kindred", "Octavia Butler", 3))
        .await
        .unwrap()
        .item;

    remote.set_online(true);
    assert_eq!(system.engine.replay().await.unwrap().applied, 1);

    let err = system
        .engine
        .update(created.id.clone(), BookPatch::available_copies(1))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotInSnapshot(ref id) if id == &created.id));
    assert_eq!(system.engine.pending_count().await.unwrap(), 0);

    system.shutdown().await;
}
