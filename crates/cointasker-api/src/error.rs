//! Error types for the HTTP layer.

use cointasker_session::SessionError;

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401 or 403. The client has already forced a
    /// logout by the time the caller sees this — treat the in-flight
    /// operation as abandoned, do not assume recovery.
    #[error("session expired (HTTP {status})")]
    Unauthorized {
        /// The rejecting status code, 401 or 403.
        status: u16,
    },

    /// Any other non-success status. Passed through unchanged; no retry
    /// policy lives in this layer.
    #[error("request failed with HTTP {status}: {message}")]
    Status {
        /// The response status code.
        status: u16,
        /// The response body, as far as it could be read.
        message: String,
    },

    /// Transport failure before any response arrived.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response arrived but its body was not the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// A base URL or endpoint path failed to parse.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments
    /// (`data:`-style URLs and the like).
    #[error("base URL {0} cannot hold path segments")]
    InvalidBaseUrl(url::Url),

    /// Minting the bearer token failed; the request was never sent.
    #[error(transparent)]
    Session(#[from] SessionError),
}
