use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header value for '{name}'.")]
    InvalidHeader { name: &'static str },
    #[error("Failed to encode request body: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
    },
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The server answered with 404 Not Found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }

    /// HTTP status returned by the server, if the request got that far.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::InvalidPath { .. }
            | ApiError::BuildClient { .. }
            | ApiError::InvalidHeader { .. }
            | ApiError::Encode { .. }
            | ApiError::Request { .. }
            | ApiError::Body { .. }
            | ApiError::Decode { .. } => None,
        }
    }
}
