#![allow(dead_code)]

use actor_store::{MemoryPersistence, Persistence};
use async_trait::async_trait;
use catalog_sync::engine::query_snapshot;
use catalog_sync::lifecycle::{SyncSystem, SystemOptions};
use catalog_sync::model::{BookFilters, BookId, BookInput, BookPatch, BookRecord, OperationId};
use catalog_sync::remote::{CatalogApi, RemoteError, RemotePage};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Health,
    List,
    Get(BookId),
    Create { key: String },
    Update(BookId),
    Delete(BookId),
    Categories,
}

#[derive(Default)]
struct FakeState {
    online: bool,
    books: Vec<BookRecord>,
    next_id: u64,
    calls: Vec<Call>,
    seen_keys: HashMap<String, BookId>,
    reject_next: Option<RemoteError>,
    lose_next_create_response: bool,
}

/// In-memory catalog service with a power switch.
pub struct FakeCatalog {
    state: Mutex<FakeState>,
}

impl FakeCatalog {
    pub fn new(books: Vec<BookRecord>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                online: true,
                books,
                next_id: 100,
                ..FakeState::default()
            }),
        })
    }

    pub fn set_online(&self, online: bool) {
        self.state.lock().unwrap().online = online;
    }

    /// The next non-health call fails with `error`.
    pub fn reject_next(&self, error: RemoteError) {
        self.state.lock().unwrap().reject_next = Some(error);
    }

    /// The next create is stored but the caller sees a transport failure.
    pub fn lose_next_create_response(&self) {
        self.state.lock().unwrap().lose_next_create_response = true;
    }

    pub fn books(&self) -> Vec<BookRecord> {
        self.state.lock().unwrap().books.clone()
    }

    pub fn book(&self, id: &str) -> Option<BookRecord> {
        self.books().into_iter().find(|b| b.id.as_str() == id)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    fn enter(&self, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if !state.online {
            return Err(RemoteError::Unavailable("connection refused".into()));
        }
        if let Some(error) = state.reject_next.take() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn health(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Health);
        if state.online {
            Ok(())
        } else {
            Err(RemoteError::Unavailable("connection refused".into()))
        }
    }

    async fn list_books(&self, filters: &BookFilters) -> Result<RemotePage, RemoteError> {
        let state = self.enter(Call::List)?;
        let page = query_snapshot(&state.books, filters);
        Ok(RemotePage {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn get_book(&self, id: &BookId) -> Result<BookRecord, RemoteError> {
        let state = self.enter(Call::Get(id.clone()))?;
        state
            .books
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| RemoteError::from_status(404, "book not found"))
    }

    async fn create_book(
        &self,
        input: &BookInput,
        idempotency_key: &OperationId,
    ) -> Result<BookRecord, RemoteError> {
        let mut state = self.enter(Call::Create {
            key: idempotency_key.to_string(),
        })?;
        if let Some(existing) = state.seen_keys.get(idempotency_key.as_str()).cloned() {
            return state
                .books
                .iter()
                .find(|b| b.id == existing)
                .cloned()
                .ok_or_else(|| RemoteError::from_status(410, "gone"));
        }
        if input.available_copies > input.total_copies {
            return Err(RemoteError::from_status(422, "available exceeds total"));
        }

        let id = BookId(state.next_id.to_string());
        state.next_id += 1;
        let record = BookRecord::from_input(id.clone(), input, Utc::now());
        state.books.push(record.clone());
        state.seen_keys.insert(idempotency_key.to_string(), id);

        if state.lose_next_create_response {
            state.lose_next_create_response = false;
            return Err(RemoteError::Unavailable("connection reset".into()));
        }
        Ok(record)
    }

    async fn update_book(&self, id: &BookId, patch: &BookPatch) -> Result<BookRecord, RemoteError> {
        let mut state = self.enter(Call::Update(id.clone()))?;
        let book = state
            .books
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| RemoteError::from_status(404, "book not found"))?;
        patch
            .apply(book, Utc::now())
            .map_err(|e| RemoteError::from_status(422, e.to_string()))?;
        Ok(book.clone())
    }

    async fn delete_book(&self, id: &BookId) -> Result<(), RemoteError> {
        let mut state = self.enter(Call::Delete(id.clone()))?;
        let before = state.books.len();
        state.books.retain(|b| &b.id != id);
        if state.books.len() == before {
            return Err(RemoteError::from_status(404, "book not found"));
        }
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, RemoteError> {
        let state = self.enter(Call::Categories)?;
        let mut categories: Vec<String> = state.books.iter().map(|b| b.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

pub fn book(id: &str, title: &str, total: u32, available: u32) -> BookRecord {
    let mut input = BookInput::new(title, "Anon", total);
    input.category = "Fiction".into();
    input.available_copies = available;
    BookRecord::from_input(BookId::from(id), &input, Utc::now())
}

pub fn options() -> SystemOptions {
    SystemOptions {
        probe_timeout: Duration::from_millis(200),
        channel_buffer: 16,
        notification_capacity: 8,
        platform: None,
    }
}

/// Starts a system over `persistence`, seeding the snapshot first when `snapshot` is non-empty.
pub fn start_with(
    api: Arc<FakeCatalog>,
    persistence: Arc<MemoryPersistence>,
    snapshot: &[BookRecord],
) -> SyncSystem {
    if !snapshot.is_empty() {
        let raw = serde_json::to_string(snapshot).unwrap();
        persistence.save("books_cache", &raw).unwrap();
    }
    SyncSystem::start(api, persistence, options()).unwrap()
}

pub fn start(api: Arc<FakeCatalog>) -> (SyncSystem, Arc<MemoryPersistence>) {
    let persistence = Arc::new(MemoryPersistence::new());
    let system = start_with(api, persistence.clone(), &[]);
    (system, persistence)
}

/// Memory persistence whose saves can be made to fail per key.
#[derive(Default)]
pub struct FlakyPersistence {
    inner: MemoryPersistence,
    failing: Mutex<HashSet<String>>,
}

impl FlakyPersistence {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_saves(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

impl Persistence for FlakyPersistence {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, contents: &str) -> io::Result<()> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.inner.save(key, contents)
    }
}

/// Like [`start_with`], over persistence whose saves can be switched off.
pub fn start_flaky(api: Arc<FakeCatalog>, snapshot: &[BookRecord]) -> (SyncSystem, Arc<FlakyPersistence>) {
    let persistence = FlakyPersistence::new();
    if !snapshot.is_empty() {
        let raw = serde_json::to_string(snapshot).unwrap();
        persistence.save("books_cache", &raw).unwrap();
    }
    let system = SyncSystem::start(api, persistence.clone(), options()).unwrap();
    (system, persistence)
}
