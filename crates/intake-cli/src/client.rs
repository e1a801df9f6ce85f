//! Shared client utilities, context, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use intake_config::{IntakeConfig, TransportMode};
use intake_core::{
    IntakeDesk, NotificationChannel, Rejection, RejectionKind, SimulatedTransport, Transport,
};
use intake_http::{EndpointClient, HttpError, HttpTransport};
use intake_telemetry::Metrics;
use reqwest::{Client, Url};

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Dependencies constructed from the effective configuration.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
    pub(crate) metrics: Metrics,
}

impl CliDependencies {
    /// Construct the shared HTTP client and metrics registry.
    pub(crate) fn new(config: &IntakeConfig) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        let metrics = Metrics::new()
            .map_err(|err| CliError::failure(anyhow!("failed to build metrics registry: {err}")))?;
        Ok(Self { client, metrics })
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) config: IntakeConfig,
    pub(crate) output: OutputFormat,
    pub(crate) metrics: Metrics,
}

impl AppContext {
    pub(crate) fn new(
        deps: CliDependencies,
        config: IntakeConfig,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let base_url = config
            .endpoint_url()
            .map_err(|err| CliError::validation(format!("invalid configuration: {}", err.describe())))?;
        Ok(Self {
            client: deps.client,
            base_url,
            config,
            output,
            metrics: deps.metrics,
        })
    }

    /// Desk wired to the requested transport and the configured policy and windows.
    pub(crate) fn desk(&self, mode: TransportMode) -> CliResult<IntakeDesk> {
        let transport: Arc<dyn Transport> = match mode {
            TransportMode::Network => Arc::new(
                HttpTransport::with_client(self.client.clone(), &self.base_url)
                    .map_err(|err| CliError::failure(anyhow::Error::new(err)))?,
            ),
            TransportMode::Simulated => {
                Arc::new(SimulatedTransport::new(self.config.simulated_delay()))
            }
        };
        Ok(
            IntakeDesk::new(self.config.policy.to_policy(), transport).with_notifications(
                NotificationChannel::new(self.config.notifications.windows()),
            ),
        )
    }

    pub(crate) fn endpoint_client(&self) -> EndpointClient {
        EndpointClient::with_client(self.client.clone(), self.base_url.clone())
    }
}

/// Map an upload rejection onto the CLI's exit code split.
pub(crate) fn classify_rejection(rejection: &Rejection) -> CliError {
    match rejection.kind {
        RejectionKind::Unreachable | RejectionKind::Unreadable => {
            CliError::failure(anyhow!("{}", rejection.reason))
        }
        RejectionKind::UnsupportedFormat
        | RejectionKind::SizeExceeded
        | RejectionKind::Endpoint { .. } => CliError::validation(rejection.reason.clone()),
    }
}

/// Map an endpoint client error onto the CLI's exit code split.
pub(crate) fn classify_http_error(err: HttpError) -> CliError {
    match err {
        HttpError::Status {
            status, detail, ..
        } if (400..500).contains(&status) => CliError::validation(
            detail.unwrap_or_else(|| format!("endpoint rejected the request ({status})")),
        ),
        HttpError::Status {
            status,
            detail,
            route,
        } => CliError::failure(anyhow!(
            "endpoint returned {status} for /{route}: {}",
            detail.as_deref().unwrap_or("no detail")
        )),
        other => CliError::failure(anyhow::Error::new(other)),
    }
}

#[cfg(test)]
pub(crate) fn test_context(endpoint: &str) -> anyhow::Result<AppContext> {
    test_context_with(IntakeConfig {
        endpoint: endpoint.to_string(),
        ..IntakeConfig::default()
    })
}

#[cfg(test)]
pub(crate) fn test_context_with(config: IntakeConfig) -> anyhow::Result<AppContext> {
    let deps = CliDependencies::new(&config).map_err(|err| anyhow!(err.display_message()))?;
    AppContext::new(deps, config, OutputFormat::Table).map_err(|err| anyhow!(err.display_message()))
}
