//! # Store Client
//!
//! The cloneable handle used to talk to a [`StoreActor`](crate::StoreActor).

use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::StoreRequest;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a `StoreActor`.
///
/// Holds only a sender, so cloning is cheap. Every method sends one request
/// and awaits the actor's reply.
pub struct StoreClient<T: StoreEntity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: StoreEntity> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: StoreEntity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, StoreError>>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// The whole collection, in stored order.
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.request(|respond_to| StoreRequest::All { respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Get { id, respond_to })
            .await
    }

    pub async fn insert(&self, item: T) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Insert { item, respond_to })
            .await
    }

    /// Replaces the entry with the same id in place, or appends.
    pub async fn upsert(&self, item: T) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Upsert {
            item,
            replacing: None,
            respond_to,
        })
        .await
    }

    /// Puts `item` into the slot currently held by `old`.
    pub async fn replace(&self, old: T::Id, item: T) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Upsert {
            item,
            replacing: Some(old),
            respond_to,
        })
        .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, StoreError> {
        self.request(|respond_to| StoreRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    /// Returns the removed entry, or `None` if nothing had that id.
    pub async fn remove(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Remove { id, respond_to })
            .await
    }

    pub async fn remove_many(&self, ids: Vec<T::Id>) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::RemoveMany { ids, respond_to })
            .await
    }

    pub async fn replace_all(&self, items: Vec<T>) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::ReplaceAll { items, respond_to })
            .await
    }

    /// Runs an action and returns the entity as it stands afterwards, with the result.
    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<(T, T::ActionResult), StoreError> {
        self.request(|respond_to| StoreRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    pub async fn clear(&self) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::Clear { respond_to })
            .await
    }
}
