//! # Vikunja Remote
//!
//! Typed access to the Vikunja REST API (`<base>/api/v1`).
//!
//! ## Layers
//!
//! ```text
//! Client ── ApiRequest ──► Transport ──► HttpTransport   (reqwest, blocking)
//!        ◄─ ApiResponse ──           └─► DryRunTransport (logs, sends nothing)
//! ```
//!
//! The [`Client`] knows endpoints and payload shapes; a [`Transport`] only
//! moves requests. Tests substitute their own transport.
//!
//! ## Key Types
//!
//! - [`Client`] - Endpoint wrappers, project resource fallback, view cache
//! - [`Transport`] - Sends one request, returns one response
//! - [`RemoteError`] - Failed request with method, path and status

mod client;
mod protocol;
mod transport;

use thiserror::Error;

pub use client::{Client, ProjectResource, ProjectView, RemoteBucket, RemoteLabel};
pub use protocol::{ApiRequest, ApiResponse, Method};
pub use transport::{DryRunTransport, HttpSettings, HttpTransport, Transport};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{method} {path} failed: {status} {body}")]
    Status {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },

    #[error("{method} {path} failed: {message}")]
    Transport {
        method: Method,
        path: String,
        message: String,
    },

    #[error("{method} {path} returned no id")]
    MissingId { method: Method, path: String },

    #[error("{method} {path} returned an unexpected body: {source}")]
    Decode {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to set up HTTP client: {0}")]
    Setup(String),
}

impl RemoteError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the server answered 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_keeps_request_context() {
        let err = RemoteError::Status {
            method: Method::Put,
            path: "/labels".to_string(),
            status: 400,
            body: "bad".to_string(),
        };

        assert_eq!(err.to_string(), "PUT /labels failed: 400 bad");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_detection() {
        let err = RemoteError::Status {
            method: Method::Get,
            path: "/projects/3".to_string(),
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());

        let err = RemoteError::Setup("x".to_string());
        assert_eq!(err.status(), None);
    }
}
