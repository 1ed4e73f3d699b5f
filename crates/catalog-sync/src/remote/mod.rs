//! # Remote Catalog
//!
//! The authoritative book store, reached over HTTP. [`CatalogApi`] is the
//! seam the engine depends on; [`HttpCatalogApi`] is the production
//! implementation and tests supply their own.
//!
//! | Call | Endpoint |
//! |---|---|
//! | `health` | `GET /health` |
//! | `list_books` | `GET /books?search=&category=&availability=&page=&per_page=` |
//! | `get_book` | `GET /books/{id}` |
//! | `create_book` | `POST /books` |
//! | `update_book` | `PUT /books/{id}` |
//! | `delete_book` | `DELETE /books/{id}` |
//! | `categories` | `GET /books/categories` |

pub mod error;
pub mod http;
pub mod probe;

pub use error::RemoteError;
pub use http::HttpCatalogApi;
pub use probe::AvailabilityProbe;

use crate::model::{BookFilters, BookId, BookInput, BookPatch, BookRecord, OperationId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of `GET /books`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePage {
    #[serde(alias = "data")]
    pub items: Vec<BookRecord>,
    pub total: u64,
    #[serde(alias = "current_page", default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

fn first_page() -> u32 {
    1
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn health(&self) -> Result<(), RemoteError>;

    async fn list_books(&self, filters: &BookFilters) -> Result<RemotePage, RemoteError>;

    async fn get_book(&self, id: &BookId) -> Result<BookRecord, RemoteError>;

    /// `idempotency_key` lets the service recognize a retried create.
    async fn create_book(
        &self,
        input: &BookInput,
        idempotency_key: &OperationId,
    ) -> Result<BookRecord, RemoteError>;

    async fn update_book(&self, id: &BookId, patch: &BookPatch) -> Result<BookRecord, RemoteError>;

    async fn delete_book(&self, id: &BookId) -> Result<(), RemoteError>;

    async fn categories(&self) -> Result<Vec<String>, RemoteError>;
}
