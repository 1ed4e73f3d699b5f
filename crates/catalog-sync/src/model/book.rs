/// A catalog item as served by the remote catalog and mirrored in the local snapshot.
///
/// # Store
/// This struct implements [`StoreEntity`](actor_store::StoreEntity) (see
/// [`crate::snapshot_actor`]), so the local snapshot is an ordered collection
/// of `BookRecord`s owned by one store actor.
///
/// `is_available` is derived: every constructor and every patch recomputes it
/// from `available_copies`, and records arriving from the remote service are
/// passed through [`BookRecord::normalized`].
use crate::snapshot_actor::BookError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Prefix of identifiers synthesized locally while the remote service is unreachable.
pub const PROVISIONAL_PREFIX: &str = "local-";

/// Stable identifier of a book record.
///
/// The remote service may encode ids as JSON numbers; they are read as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(pub String);

impl BookId {
    /// A fresh locally-unique id that cannot collide with a server id.
    pub fn provisional() -> Self {
        Self(format!("{PROVISIONAL_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_number: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BookRecord {
    /// Builds the optimistic local record for an input the remote could not accept yet.
    pub fn from_input(id: BookId, input: &BookInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title.clone(),
            author: input.author.clone(),
            category: input.category.clone(),
            isbn: input.isbn.clone(),
            internal_number: input.internal_number.clone(),
            total_copies: input.total_copies,
            available_copies: input.available_copies,
            is_available: input.available_copies > 0,
            synopsis: input.synopsis.clone(),
            cover_url: input.cover_url.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Re-derives `is_available` from the copy counts.
    pub fn normalized(mut self) -> Self {
        self.is_available = self.available_copies > 0;
        self
    }

    pub fn validate(&self) -> Result<(), BookError> {
        check_copy_counts(self.total_copies, self.available_copies)
    }

    /// The metadata reservations keep so the UI does not need to re-join.
    pub fn summary(&self) -> BookSummary {
        BookSummary {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            cover_url: self.cover_url.clone(),
        }
    }
}

fn check_copy_counts(total: u32, available: u32) -> Result<(), BookError> {
    if available > total {
        return Err(BookError::CopyCountsOutOfRange { total, available });
    }
    Ok(())
}

/// Denormalized book metadata captured at reservation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

/// Body of a create request: every record field except id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_number: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl BookInput {
    pub fn new(title: impl Into<String>, author: impl Into<String>, total_copies: u32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            category: String::new(),
            isbn: None,
            internal_number: None,
            total_copies,
            available_copies: total_copies,
            synopsis: None,
            cover_url: None,
        }
    }

    /// The derived availability flag, after checking the copy counts.
    pub fn availability(&self) -> Result<bool, BookError> {
        check_copy_counts(self.total_copies, self.available_copies)?;
        Ok(self.available_copies > 0)
    }
}

/// Partial update. Absent fields are left unchanged and are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl BookPatch {
    pub fn available_copies(available: u32) -> Self {
        Self {
            available_copies: Some(available),
            ..Self::default()
        }
    }

    /// Applies the patch to `record`. On error `record` is unchanged.
    pub fn apply(&self, record: &mut BookRecord, now: DateTime<Utc>) -> Result<(), BookError> {
        let total = self.total_copies.unwrap_or(record.total_copies);
        let available = self.available_copies.unwrap_or(record.available_copies);
        check_copy_counts(total, available)?;

        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(author) = &self.author {
            record.author = author.clone();
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if let Some(isbn) = &self.isbn {
            record.isbn = Some(isbn.clone());
        }
        if let Some(number) = &self.internal_number {
            record.internal_number = Some(number.clone());
        }
        if let Some(synopsis) = &self.synopsis {
            record.synopsis = Some(synopsis.clone());
        }
        if let Some(cover_url) = &self.cover_url {
            record.cover_url = Some(cover_url.clone());
        }
        record.total_copies = total;
        record.available_copies = available;
        record.is_available = available > 0;
        record.updated_at = Some(now);
        Ok(())
    }
}
