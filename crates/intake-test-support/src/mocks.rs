//! Transport doubles with scripted outcomes.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use intake_core::{LedgerEntry, SelectedFile, Transport, UploadOutcome};

/// Transport that replays queued outcomes and records every call.
///
/// With an empty queue it accepts the file as declared.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<UploadOutcome>>,
    submitted: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    delays_by_name: HashMap<String, Duration>,
}

impl ScriptedTransport {
    /// Transport that accepts everything immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes returned in order by subsequent calls.
    #[must_use]
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = UploadOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Sleep for `delay` before answering each call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delay` before answering calls for the file named `name`,
    /// overriding [`ScriptedTransport::with_delay`] for that file.
    #[must_use]
    pub fn with_delay_for(mut self, name: impl Into<String>, delay: Duration) -> Self {
        self.delays_by_name.insert(name.into(), delay);
        self
    }

    /// Number of `submit` calls observed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Names of submitted files in call order.
    #[must_use]
    pub fn submitted(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn submit(&self, file: &SelectedFile) -> UploadOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(file.candidate.name.clone());
        let delay = self
            .delays_by_name
            .get(&file.candidate.name)
            .copied()
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        scripted.unwrap_or_else(|| UploadOutcome::Accepted(LedgerEntry::from(&file.candidate)))
    }
}
