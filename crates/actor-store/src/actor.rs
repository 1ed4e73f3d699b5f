//! # Store Actor
//!
//! This module defines the `StoreActor`, the task that exclusively owns one
//! persisted collection. It processes messages sequentially, so every
//! read-modify-write of the collection is atomic with respect to every other
//! caller without any lock around the data.

use crate::client::StoreClient;
use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::persistence::Persistence;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns an ordered collection of `T`.
///
/// # Architecture Note
/// This struct is the "Server" half. It owns the collection (`items`), the
/// receiver end of the channel and the persistence handle. Callers only ever
/// hold a [`StoreClient`].
///
/// Mutations are applied to a working copy, the working copy is saved under
/// `key`, and only then does it replace `items`. A failed hook or a failed save
/// leaves the collection exactly as it was.
///
/// # Usage Pattern
///
/// 1.  **Open**: `StoreActor::open(persistence, key, buffer)` loads the collection
///     and returns the `actor` and its `client`.
/// 2.  **Run**: spawn `actor.run()` on the runtime.
/// 3.  **Use**: clone the client wherever the collection is needed.
///
/// The actor exits when the last client is dropped.
pub struct StoreActor<T: StoreEntity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    items: Vec<T>,
    persistence: Arc<dyn Persistence>,
    key: String,
}

impl<T: StoreEntity> StoreActor<T> {
    /// Loads the collection stored under `key` and creates the actor/client pair.
    ///
    /// A missing key starts an empty collection. Content that does not parse
    /// as a JSON array of `T` is reported as [`StoreError::Corrupt`].
    /// A `buffer_size` of zero is raised to one.
    pub fn open(
        persistence: Arc<dyn Persistence>,
        key: impl Into<String>,
        buffer_size: usize,
    ) -> Result<(Self, StoreClient<T>), StoreError> {
        let key = key.into();
        let items = match persistence
            .load(&key)
            .map_err(|source| StoreError::Persistence {
                key: key.clone(),
                source,
            })? {
            Some(raw) => serde_json::from_str::<Vec<T>>(&raw).map_err(|source| {
                StoreError::Corrupt {
                    key: key.clone(),
                    source,
                }
            })?,
            None => Vec::new(),
        };

        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let actor = Self {
            receiver,
            items,
            persistence,
            key,
        };
        Ok((actor, StoreClient::new(sender)))
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Saves `next` and, on success, makes it the current collection.
    fn commit(&mut self, next: Vec<T>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&next).map_err(|source| StoreError::Corrupt {
            key: self.key.clone(),
            source,
        })?;
        self.persistence
            .save(&self.key, &raw)
            .map_err(|source| StoreError::Persistence {
                key: self.key.clone(),
                source,
            })?;
        self.items = next;
        Ok(())
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let key = self.key.clone();
        info!(entity_type, %key, size = self.items.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::All { respond_to } => {
                    debug!(entity_type, size = self.items.len(), "All");
                    let _ = respond_to.send(Ok(self.items.clone()));
                }
                StoreRequest::Get { id, respond_to } => {
                    let item = self.position(&id).map(|idx| self.items[idx].clone());
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Insert { item, respond_to } => {
                    debug!(entity_type, id = %item.id(), "Insert");
                    if let Err(e) = item.check_insert(&self.items) {
                        warn!(entity_type, id = %item.id(), error = %e, "Insert rejected");
                        let _ = respond_to.send(Err(StoreError::Entity(Box::new(e))));
                        continue;
                    }
                    let id = item.id().clone();
                    let mut next = self.items.clone();
                    next.push(item);
                    let result = self.commit(next);
                    match &result {
                        Ok(()) => info!(entity_type, %id, size = self.items.len(), "Inserted"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Upsert {
                    item,
                    replacing,
                    respond_to,
                } => {
                    let target = replacing.unwrap_or_else(|| item.id().clone());
                    debug!(entity_type, %target, id = %item.id(), "Upsert");
                    let mut next = self.items.clone();
                    match next.iter().position(|existing| existing.id() == &target) {
                        Some(idx) => {
                            next[idx] = item.clone();
                            // The new id may already be present elsewhere; keep only the slot at idx.
                            let mut cursor = 0;
                            next.retain(|existing| {
                                let keep = cursor == idx || existing.id() != item.id();
                                cursor += 1;
                                keep
                            });
                        }
                        None => match next.iter().position(|existing| existing.id() == item.id()) {
                            Some(idx) => next[idx] = item.clone(),
                            None => next.push(item.clone()),
                        },
                    }
                    let result = self.commit(next);
                    match &result {
                        Ok(()) => info!(entity_type, id = %item.id(), size = self.items.len(), "Upserted"),
                        Err(e) => warn!(entity_type, id = %item.id(), error = %e, "Upsert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(idx) = self.position(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut next = self.items.clone();
                    if let Err(e) = next[idx].on_update(update) {
                        warn!(entity_type, %id, error = %e, "Update rejected");
                        let _ = respond_to.send(Err(StoreError::Entity(Box::new(e))));
                        continue;
                    }
                    let updated = next[idx].clone();
                    let result = self.commit(next).map(|()| updated);
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Updated"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Remove { id, respond_to } => {
                    debug!(entity_type, %id, "Remove");
                    let Some(idx) = self.position(&id) else {
                        let _ = respond_to.send(Ok(None));
                        continue;
                    };
                    let mut next = self.items.clone();
                    let removed = next.remove(idx);
                    let result = self.commit(next).map(|()| Some(removed));
                    match &result {
                        Ok(_) => info!(entity_type, %id, size = self.items.len(), "Removed"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Remove failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::RemoveMany { ids, respond_to } => {
                    debug!(entity_type, count = ids.len(), "RemoveMany");
                    let mut next = self.items.clone();
                    next.retain(|item| !ids.contains(item.id()));
                    let removed = self.items.len() - next.len();
                    let result = if removed == 0 {
                        Ok(0)
                    } else {
                        self.commit(next).map(|()| removed)
                    };
                    match &result {
                        Ok(removed) => info!(entity_type, removed, size = self.items.len(), "Removed many"),
                        Err(e) => warn!(entity_type, error = %e, "RemoveMany failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::ReplaceAll { items, respond_to } => {
                    debug!(entity_type, size = items.len(), "ReplaceAll");
                    let result = self.commit(items);
                    match &result {
                        Ok(()) => info!(entity_type, size = self.items.len(), "Replaced"),
                        Err(e) => warn!(entity_type, error = %e, "ReplaceAll failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(idx) = self.position(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut next = self.items.clone();
                    let outcome = match next[idx].handle_action(action) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action rejected");
                            let _ = respond_to.send(Err(StoreError::Entity(Box::new(e))));
                            continue;
                        }
                    };
                    let updated = next[idx].clone();
                    let result = self.commit(next).map(|()| (updated, outcome));
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Clear { respond_to } => {
                    let cleared = self.items.len();
                    debug!(entity_type, cleared, "Clear");
                    let result = self.commit(Vec::new()).map(|()| cleared);
                    if let Err(e) = &result {
                        warn!(entity_type, error = %e, "Clear failed");
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, %key, size = self.items.len(), "Shutdown");
    }
}
