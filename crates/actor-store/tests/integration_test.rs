use actor_store::{JsonFilePersistence, MemoryPersistence, StoreActor, StoreEntity, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Ticket {
    id: u32,
    holder: String,
    open: bool,
}

#[derive(Debug)]
struct TicketUpdate {
    holder: Option<String>,
}

#[derive(Debug)]
enum TicketAction {
    Close,
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum TicketError {
    #[error("holder {0} already has an open ticket")]
    Duplicate(String),
    #[error("holder must not be empty")]
    EmptyHolder,
    #[error("ticket already closed")]
    AlreadyClosed,
}

impl StoreEntity for Ticket {
    type Id = u32;
    type Update = TicketUpdate;
    type Action = TicketAction;
    type ActionResult = bool;
    type Error = TicketError;

    fn id(&self) -> &u32 {
        &self.id
    }

    fn check_insert(&self, existing: &[Self]) -> Result<(), TicketError> {
        if existing.iter().any(|t| t.open && t.holder == self.holder) {
            return Err(TicketError::Duplicate(self.holder.clone()));
        }
        Ok(())
    }

    fn on_update(&mut self, update: TicketUpdate) -> Result<(), TicketError> {
        if let Some(holder) = update.holder {
            if holder.is_empty() {
                return Err(TicketError::EmptyHolder);
            }
            self.holder = holder;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: TicketAction) -> Result<bool, TicketError> {
        match action {
            TicketAction::Close if !self.open => Err(TicketError::AlreadyClosed),
            TicketAction::Close => {
                self.open = false;
                Ok(true)
            }
        }
    }
}

fn ticket(id: u32, holder: &str) -> Ticket {
    Ticket {
        id,
        holder: holder.to_string(),
        open: true,
    }
}

#[tokio::test]
async fn test_store_lifecycle() {
    let persistence = Arc::new(MemoryPersistence::new());
    let (actor, client) = StoreActor::<Ticket>::open(persistence.clone(), "tickets", 10).unwrap();
    let handle = tokio::spawn(actor.run());

    client.insert(ticket(1, "ada")).await.unwrap();
    client.insert(ticket(2, "grace")).await.unwrap();

    // Collection-wide rule enforced inside the actor
    let dup = client.insert(ticket(3, "ada")).await.unwrap_err();
    assert_eq!(
        dup.entity::<TicketError>(),
        Some(&TicketError::Duplicate("ada".into()))
    );

    let updated = client
        .update(2, TicketUpdate { holder: Some("hopper".into()) })
        .await
        .unwrap();
    assert_eq!(updated.holder, "hopper");

    let (closed, changed) = client.perform_action(1, TicketAction::Close).await.unwrap();
    assert!(!closed.open);
    assert!(changed);

    let err = client.perform_action(1, TicketAction::Close).await.unwrap_err();
    assert_eq!(err.entity::<TicketError>(), Some(&TicketError::AlreadyClosed));

    let missing = client.perform_action(99, TicketAction::Close).await.unwrap_err();
    assert!(matches!(missing, StoreError::NotFound(id) if id == "99"));

    // Order is preserved
    let ids: Vec<u32> = client.all().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);

    drop(client);
    handle.await.unwrap();

    // A new session sees the persisted collection
    let (actor, client) = StoreActor::<Ticket>::open(persistence, "tickets", 10).unwrap();
    tokio::spawn(actor.run());
    let reopened = client.all().await.unwrap();
    assert_eq!(reopened.len(), 2);
    assert!(!reopened[0].open);
    assert_eq!(reopened[1].holder, "hopper");
}

#[tokio::test]
async fn test_rejected_update_leaves_state_untouched() {
    let persistence = Arc::new(MemoryPersistence::new());
    let (actor, client) = StoreActor::<Ticket>::open(persistence.clone(), "tickets", 10).unwrap();
    tokio::spawn(actor.run());

    client.insert(ticket(1, "ada")).await.unwrap();
    let before = persistence.raw("tickets").unwrap();

    let err = client
        .update(1, TicketUpdate { holder: Some(String::new()) })
        .await
        .unwrap_err();
    assert_eq!(err.entity::<TicketError>(), Some(&TicketError::EmptyHolder));

    assert_eq!(client.get(1).await.unwrap().unwrap().holder, "ada");
    assert_eq!(persistence.raw("tickets").unwrap(), before);
}

#[tokio::test]
async fn test_upsert_replace_and_bulk_operations() {
    let (actor, client) =
        StoreActor::<Ticket>::open(Arc::new(MemoryPersistence::new()), "tickets", 10).unwrap();
    tokio::spawn(actor.run());

    client
        .replace_all(vec![ticket(1, "a"), ticket(2, "b"), ticket(3, "c")])
        .await
        .unwrap();

    // Upsert in place keeps position
    client.upsert(ticket(2, "bee")).await.unwrap();
    // Replace swaps the id while keeping the slot
    client.replace(1, ticket(10, "a")).await.unwrap();
    // Upsert of an unknown id appends
    client.upsert(ticket(4, "d")).await.unwrap();

    let ids: Vec<u32> = client.all().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![10, 2, 3, 4]);
    assert_eq!(client.get(2).await.unwrap().unwrap().holder, "bee");

    assert_eq!(client.remove_many(vec![2, 4, 77]).await.unwrap(), 2);
    assert_eq!(client.remove(3).await.unwrap().map(|t| t.id), Some(3));
    assert_eq!(client.remove(3).await.unwrap(), None);
    assert_eq!(client.clear().await.unwrap(), 1);
    assert!(client.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_backed_store_and_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Arc::new(JsonFilePersistence::open(dir.path()).unwrap());

    {
        let (actor, client) =
            StoreActor::<Ticket>::open(persistence.clone(), "tickets", 10).unwrap();
        let handle = tokio::spawn(actor.run());
        client.insert(ticket(1, "ada")).await.unwrap();
        drop(client);
        handle.await.unwrap();
    }

    let (actor, client) = StoreActor::<Ticket>::open(persistence.clone(), "tickets", 10).unwrap();
    tokio::spawn(actor.run());
    assert_eq!(client.all().await.unwrap(), vec![ticket(1, "ada")]);

    std::fs::write(persistence.path_for("broken"), "{not json").unwrap();
    let err = StoreActor::<Ticket>::open(persistence, "broken", 10).err().unwrap();
    assert!(matches!(err, StoreError::Corrupt { key, .. } if key == "broken"));
}

#[tokio::test]
async fn test_zero_buffer_is_usable() {
    let (actor, client) =
        StoreActor::<Ticket>::open(Arc::new(MemoryPersistence::new()), "tickets", 0).unwrap();
    tokio::spawn(actor.run());

    client.insert(ticket(1, "ada")).await.unwrap();
    client.insert(ticket(2, "grace")).await.unwrap();
    assert_eq!(client.all().await.unwrap().len(), 2);
}
