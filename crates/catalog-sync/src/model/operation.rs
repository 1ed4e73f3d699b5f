/// A mutation that could not be applied remotely when it was issued.
///
/// # Store
/// Kept in the pending-operation log (see [`crate::pending_actor`]) in
/// enqueue order. Deletes are never deferred, so the kind enum has no
/// variant for them.
use crate::model::{BookId, BookInput, BookPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a pending operation. Also sent as the idempotency key for creates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub String);

impl OperationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    Create {
        /// The id the optimistic snapshot record was stored under.
        provisional_id: BookId,
        input: BookInput,
    },
    Update {
        #[serde(rename = "target")]
        id: BookId,
        patch: BookPatch,
    },
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Create { .. } => "create",
            OperationKind::Update { .. } => "update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub id: OperationId,
    #[serde(flatten)]
    pub kind: OperationKind,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn create(id: OperationId, provisional_id: BookId, input: BookInput) -> Self {
        Self {
            id,
            kind: OperationKind::Create {
                provisional_id,
                input,
            },
            enqueued_at: Utc::now(),
        }
    }

    pub fn update(id: BookId, patch: BookPatch) -> Self {
        Self {
            id: OperationId::generate(),
            kind: OperationKind::Update { id, patch },
            enqueued_at: Utc::now(),
        }
    }

    /// The remote record this operation targets. `None` for creates.
    pub fn target(&self) -> Option<&BookId> {
        match &self.kind {
            OperationKind::Create { .. } => None,
            OperationKind::Update { id, .. } => Some(id),
        }
    }
}
