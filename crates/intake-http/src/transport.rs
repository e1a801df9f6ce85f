//! Multipart upload against the intake endpoint.

use std::time::Duration;

use async_trait::async_trait;
use intake_core::{
    LedgerEntry, RejectionKind, SelectedFile, Transport, UploadOutcome, messages,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{HttpError, HttpResult};
use crate::routes;

/// Client-wide timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "file";

const UPLOAD_ROUTE: &str = "upload";

/// Network transport posting each file to `{base}/upload`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    upload_url: Url,
}

impl HttpTransport {
    /// Build a transport with its own client and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be built or the route cannot be joined.
    pub fn new(base: &Url, timeout: Duration) -> HttpResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| HttpError::Client { source })?;
        Self::with_client(client, base)
    }

    /// Build a transport on a shared client.
    ///
    /// # Errors
    ///
    /// Returns an error when the upload route cannot be joined onto `base`.
    pub fn with_client(client: Client, base: &Url) -> HttpResult<Self> {
        let upload_url = routes::route(base, UPLOAD_ROUTE).map_err(|source| HttpError::Route {
            route: UPLOAD_ROUTE.to_string(),
            source,
        })?;
        Ok(Self { client, upload_url })
    }

    /// Absolute URL files are posted to.
    #[must_use]
    pub const fn upload_url(&self) -> &Url {
        &self.upload_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn submit(&self, file: &SelectedFile) -> UploadOutcome {
        let candidate = &file.candidate;
        let bytes = match file.payload.read().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(filename = %candidate.name, error = %err, "failed to read upload payload");
                return UploadOutcome::rejected(RejectionKind::Unreadable, messages::FILE_UNREADABLE);
            }
        };

        let part = match Part::bytes(bytes)
            .file_name(candidate.name.clone())
            .mime_str(&candidate.declared_media_type)
        {
            Ok(part) => part,
            Err(err) => {
                warn!(
                    media_type = %candidate.declared_media_type,
                    error = %err,
                    "declared media type is not a valid MIME string"
                );
                return UploadOutcome::rejected(
                    RejectionKind::Endpoint { status: None },
                    messages::UPLOAD_ERROR,
                );
            }
        };
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = match self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %self.upload_url, error = %err, "upload request received no response");
                return UploadOutcome::rejected(
                    RejectionKind::Unreachable,
                    messages::SERVER_UNREACHABLE,
                );
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(err) if err.is_timeout() => {
                warn!(url = %self.upload_url, error = %err, "upload response body timed out");
                return UploadOutcome::rejected(
                    RejectionKind::Unreachable,
                    messages::SERVER_UNREACHABLE,
                );
            }
            Err(err) => {
                debug!(error = %err, "upload response body could not be read");
                None
            }
        };
        debug!(status = status.as_u16(), has_body = body.is_some(), "upload response received");
        outcome_from_response(status, body.as_ref())
    }
}

/// Translate an endpoint response into an outcome.
fn outcome_from_response(status: StatusCode, body: Option<&Value>) -> UploadOutcome {
    if status.is_success() {
        if let Some(entry) = body.and_then(accepted_entry) {
            return UploadOutcome::Accepted(entry);
        }
        let reason = body
            .and_then(|body| text_field(body, "error"))
            .unwrap_or(messages::UPLOAD_ERROR);
        return UploadOutcome::rejected(RejectionKind::Endpoint { status: None }, reason);
    }

    let reason = body
        .and_then(|body| text_field(body, "detail"))
        .unwrap_or(messages::UPLOAD_ERROR);
    UploadOutcome::rejected(
        RejectionKind::Endpoint {
            status: Some(status.as_u16()),
        },
        reason,
    )
}

fn accepted_entry(body: &Value) -> Option<LedgerEntry> {
    Some(LedgerEntry {
        filename: text_field(body, "filename")?.to_string(),
        byte_size: body.get("file_size")?.as_u64()?,
        content_type: text_field(body, "content_type")?.to_string(),
    })
}

fn text_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)?.as_str()
}
