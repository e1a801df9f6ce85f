//! Error types for the endpoint client.

use thiserror::Error;

/// Failures talking to the upload endpoint's auxiliary routes.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// A route could not be joined onto the base URL.
    #[error("invalid endpoint route")]
    Route {
        /// Route that failed to join.
        route: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// No response was received.
    #[error("endpoint unreachable")]
    Unreachable {
        /// Route that was requested.
        route: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a failure status.
    #[error("endpoint returned an error status")]
    Status {
        /// Route that was requested.
        route: String,
        /// HTTP status code.
        status: u16,
        /// `detail` text from the response body, when present.
        detail: Option<String>,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode endpoint response")]
    Decode {
        /// Route that was requested.
        route: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

/// Convenience alias for endpoint client results.
pub type HttpResult<T> = Result<T, HttpError>;
