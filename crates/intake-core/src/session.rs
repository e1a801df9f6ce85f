//! Per-submission state machine: `Idle → Validating → Uploading → Settled`.
//!
//! Rejections from validation settle immediately without touching the
//! transport. `Settled` is terminal; the next selection starts a new session.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};
use crate::model::{CandidateFile, SelectedFile, Selection, UploadOutcome, ValidationPolicy};
use crate::transport::Transport;
use crate::validate::validate;

/// Lifecycle of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a selection.
    Idle,
    /// A candidate was selected and awaits the policy check.
    Validating,
    /// The transport call is in flight.
    Uploading,
    /// Terminal outcome reached.
    Settled(UploadOutcome),
}

impl SessionState {
    /// Stable label for logs and errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Uploading => "uploading",
            Self::Settled(_) => "settled",
        }
    }

    /// Outcome once settled.
    #[must_use]
    pub const fn outcome(&self) -> Option<&UploadOutcome> {
        match self {
            Self::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// One submission attempt. Owns the selected file until the outcome exists.
#[derive(Debug)]
pub struct UploadSession {
    id: Uuid,
    state: SessionState,
    file: Option<SelectedFile>,
}

impl UploadSession {
    /// Fresh session in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            file: None,
        }
    }

    /// Submission identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Candidate under submission; gone once the session settles.
    #[must_use]
    pub fn candidate(&self) -> Option<&CandidateFile> {
        self.file.as_ref().map(|file| &file.candidate)
    }

    /// Accept a selection. Only the first file is used; an empty selection
    /// leaves the session in `Idle` and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is `Idle`.
    pub fn select(&mut self, selection: Selection) -> SessionResult<bool> {
        self.require("select", matches!(self.state, SessionState::Idle))?;

        let ignored = selection.len().saturating_sub(1);
        let Some(file) = selection.into_first() else {
            debug!(submission_id = %self.id, "empty selection ignored");
            return Ok(false);
        };
        if ignored > 0 {
            debug!(submission_id = %self.id, ignored, "extra selected files ignored");
        }

        info!(
            submission_id = %self.id,
            filename = %file.candidate.name,
            byte_size = file.candidate.byte_size,
            media_type = %file.candidate.declared_media_type,
            "validating candidate"
        );
        self.file = Some(file);
        self.state = SessionState::Validating;
        Ok(true)
    }

    /// Apply the policy. Returns the outcome when validation rejected the
    /// candidate (now `Settled`), or `None` when it passed (now `Uploading`).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is `Validating`.
    pub fn validate(&mut self, policy: &ValidationPolicy) -> SessionResult<Option<UploadOutcome>> {
        let file = match (&self.state, &self.file) {
            (SessionState::Validating, Some(file)) => file,
            _ => return Err(self.invalid("validate")),
        };

        match validate(&file.candidate, policy) {
            Ok(()) => {
                debug!(submission_id = %self.id, "candidate passed validation");
                self.state = SessionState::Uploading;
                Ok(None)
            }
            Err(rejection) => {
                info!(
                    submission_id = %self.id,
                    kind = rejection.kind.as_str(),
                    "candidate rejected by policy"
                );
                Ok(Some(self.settle(UploadOutcome::Rejected(rejection))))
            }
        }
    }

    /// Hand the candidate to the transport and settle with its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is `Uploading`.
    pub async fn upload(&mut self, transport: &dyn Transport) -> SessionResult<UploadOutcome> {
        let file = match (&self.state, &self.file) {
            (SessionState::Uploading, Some(file)) => file,
            _ => return Err(self.invalid("upload")),
        };

        info!(
            submission_id = %self.id,
            transport = transport.name(),
            "upload started"
        );
        let outcome = transport.submit(file).await;
        info!(
            submission_id = %self.id,
            outcome = outcome.label(),
            "upload settled"
        );
        Ok(self.settle(outcome))
    }

    fn settle(&mut self, outcome: UploadOutcome) -> UploadOutcome {
        self.file = None;
        self.state = SessionState::Settled(outcome.clone());
        outcome
    }

    fn require(&self, operation: &'static str, allowed: bool) -> SessionResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    const fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state.label(),
            operation,
        }
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}
