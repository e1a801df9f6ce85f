//! Transport capability shared by the network and simulated variants.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::model::{LedgerEntry, SelectedFile, UploadOutcome};

/// Artificial delay used by [`SimulatedTransport`] by default.
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(2_000);

/// Sends a validated file somewhere and normalizes the result.
///
/// Implementations produce exactly one outcome per call and never retry.
/// Every failure, including unreachable endpoints, settles as
/// [`UploadOutcome::Rejected`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label for logs and events.
    fn name(&self) -> &'static str;

    /// Submit one validated file.
    async fn submit(&self, file: &SelectedFile) -> UploadOutcome;
}

/// Transport that never touches the network: after a fixed delay it accepts
/// the file using the candidate's own metadata.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    /// Simulated transport with a custom delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_DELAY)
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn submit(&self, file: &SelectedFile) -> UploadOutcome {
        debug!(
            filename = %file.candidate.name,
            delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
            "simulating upload"
        );
        tokio::time::sleep(self.delay).await;
        UploadOutcome::Accepted(LedgerEntry::from(&file.candidate))
    }
}
