//! Errors from the remote catalog service.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteError {
    /// The service could not be reached or answered with a transient status.
    /// Writes that fail this way are applied locally and queued.
    #[error("Remote catalog unavailable: {0}")]
    Unavailable(String),

    /// The service understood the request and refused it.
    #[error("Remote catalog rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A success status with a body that does not decode.
    #[error("Invalid response from remote catalog: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Classifies a non-success HTTP status.
    ///
    /// 5xx, 408 and 429 are transient. Everything else is a domain refusal.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 || status == 408 || status == 429 {
            RemoteError::Unavailable(format!("HTTP {status}: {message}"))
        } else {
            RemoteError::Rejected { status, message }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Rejected { status: 404, .. })
    }
}
