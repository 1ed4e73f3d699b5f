//! `reqwest` implementation of [`CatalogApi`].
//!
//! Transport failures and timeouts map to [`RemoteError::Unavailable`];
//! statuses are classified by [`RemoteError::from_status`].

use super::{CatalogApi, RemoteError, RemotePage};
use crate::model::{BookFilters, BookId, BookInput, BookPatch, BookRecord, OperationId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: reqwest::Client,
    base_url: String,
}

/// `POST /books` body: the input plus its derived availability flag.
#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    input: &'a BookInput,
    is_available: bool,
}

/// `PUT /books/{id}` body. The flag is only sent when the patch moves the count.
#[derive(Serialize)]
struct UpdateBody<'a> {
    #[serde(flatten)]
    patch: &'a BookPatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_available: Option<bool>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Accepts both a bare record and `{"data": record}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Unavailable(e.to_string())
}

impl HttpCatalogApi {
    /// Builds a client whose requests give up after `request_timeout`.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn book_url(&self, id: &BookId) -> String {
        self.url(&format!("/books/{id}"))
    }

    /// Sends `request` and returns the response if its status is a success.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        debug!(status = status.as_u16(), %message, "remote refused request");
        Err(RemoteError::from_status(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice::<Envelope<T>>(&bytes)
            .map(Envelope::into_inner)
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn health(&self) -> Result<(), RemoteError> {
        self.send(self.client.get(self.url("/health"))).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_books(&self, filters: &BookFilters) -> Result<RemotePage, RemoteError> {
        let request = self
            .client
            .get(self.url("/books"))
            .query(&filters.query_pairs());
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_book(&self, id: &BookId) -> Result<BookRecord, RemoteError> {
        let response = self.send(self.client.get(self.book_url(id))).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_book(
        &self,
        input: &BookInput,
        idempotency_key: &OperationId,
    ) -> Result<BookRecord, RemoteError> {
        let body = CreateBody {
            input,
            is_available: input.available_copies > 0,
        };
        let request = self
            .client
            .post(self.url("/books"))
            .header(IDEMPOTENCY_HEADER, idempotency_key.as_str())
            .json(&body);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn update_book(&self, id: &BookId, patch: &BookPatch) -> Result<BookRecord, RemoteError> {
        let body = UpdateBody {
            patch,
            is_available: patch.available_copies.map(|available| available > 0),
        };
        let response = self.send(self.client.put(self.book_url(id)).json(&body)).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn delete_book(&self, id: &BookId) -> Result<(), RemoteError> {
        self.send(self.client.delete(self.book_url(id))).await?;
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, RemoteError> {
        let response = self.send(self.client.get(self.url("/books/categories"))).await?;
        Self::decode(response).await
    }
}
