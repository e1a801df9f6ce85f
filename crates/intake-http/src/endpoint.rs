//! Read-only routes exposed next to the upload route.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{HttpError, HttpResult};
use crate::routes;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` when the service is up.
    pub status: String,
    /// Service identifier.
    pub service: String,
}

impl HealthStatus {
    /// Whether the endpoint reported itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// A file held by the endpoint's storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Stored file name.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time as seconds since the Unix epoch.
    pub modified: f64,
}

/// Body of `GET /files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileListing {
    /// Stored files in the order the endpoint reported them.
    pub files: Vec<StoredFile>,
    /// Number of files reported.
    pub count: usize,
}

/// Client for the endpoint's health and listing routes.
#[derive(Clone)]
pub struct EndpointClient {
    client: Client,
    base: Url,
}

impl EndpointClient {
    /// Build a client with its own request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> HttpResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| HttpError::Client { source })?;
        Ok(Self::with_client(client, base))
    }

    /// Build a client on a shared `reqwest::Client`.
    #[must_use]
    pub const fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Base URL all routes are joined onto.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Query `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is unreachable, answers with a
    /// failure status, or returns an unexpected body.
    pub async fn health(&self) -> HttpResult<HealthStatus> {
        self.get_json("health").await
    }

    /// Query `GET /files`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EndpointClient::health`].
    pub async fn list_files(&self) -> HttpResult<FileListing> {
        self.get_json("files").await
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> HttpResult<T> {
        let url = routes::route(&self.base, route).map_err(|source| HttpError::Route {
            route: route.to_string(),
            source,
        })?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| HttpError::Unreachable {
                route: route.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(route, status = status.as_u16(), "endpoint response received");
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("detail")?.as_str().map(str::to_string));
            return Err(HttpError::Status {
                route: route.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<T>().await.map_err(|source| HttpError::Decode {
            route: route.to_string(),
            source,
        })
    }
}
