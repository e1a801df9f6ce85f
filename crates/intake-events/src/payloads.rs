//! Event payload types emitted by the upload desk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to each event published on the bus.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Upload lifecycle events surfaced to display consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntakeEvent {
    /// A single-file selection entered validation.
    SubmissionStarted {
        /// Identifier of the submission.
        submission_id: Uuid,
        /// File name as declared by the selection surface.
        filename: String,
    },
    /// Validation passed and the transport call began.
    UploadStarted {
        /// Identifier of the submission.
        submission_id: Uuid,
        /// Transport variant performing the call.
        transport: String,
    },
    /// The submission settled as accepted.
    UploadAccepted {
        /// Identifier of the submission.
        submission_id: Uuid,
        /// Stored file name reported by the endpoint.
        filename: String,
        /// Stored size in bytes.
        byte_size: u64,
        /// Stored media type.
        content_type: String,
    },
    /// The submission settled as rejected.
    UploadRejected {
        /// Identifier of the submission.
        submission_id: Uuid,
        /// Machine-friendly rejection class (e.g. `unsupported_format`).
        kind: String,
        /// Human-readable reason shown to the user.
        reason: String,
    },
    /// A transient notification replaced the visible one.
    NotificationRaised {
        /// `success` or `error`.
        kind: String,
        /// Message text.
        message: String,
    },
}

impl IntakeEvent {
    /// Machine-friendly discriminator for log and metric labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SubmissionStarted { .. } => "submission_started",
            Self::UploadStarted { .. } => "upload_started",
            Self::UploadAccepted { .. } => "upload_accepted",
            Self::UploadRejected { .. } => "upload_rejected",
            Self::NotificationRaised { .. } => "notification_raised",
        }
    }

    /// Submission the event belongs to, if any.
    #[must_use]
    pub const fn submission_id(&self) -> Option<Uuid> {
        match self {
            Self::SubmissionStarted { submission_id, .. }
            | Self::UploadStarted { submission_id, .. }
            | Self::UploadAccepted { submission_id, .. }
            | Self::UploadRejected { submission_id, .. } => Some(*submission_id),
            Self::NotificationRaised { .. } => None,
        }
    }

    /// Whether the event marks the end of a submission.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::UploadAccepted { .. } | Self::UploadRejected { .. }
        )
    }
}

/// Event wrapper carrying the bus-assigned id and publish timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier assigned by the bus.
    pub id: EventId,
    /// Wall-clock publish time.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub event: IntakeEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serde_tag() {
        let event = IntakeEvent::UploadRejected {
            submission_id: Uuid::nil(),
            kind: "size_exceeded".into(),
            reason: "too big".into(),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], event.kind());
        assert!(event.is_settled());
        assert_eq!(event.submission_id(), Some(Uuid::nil()));
    }

    #[test]
    fn notifications_are_not_tied_to_a_submission() {
        let event = IntakeEvent::NotificationRaised {
            kind: "error".into(),
            message: "x".into(),
        };
        assert_eq!(event.submission_id(), None);
        assert!(!event.is_settled());
        assert_eq!(event.kind(), "notification_raised");
    }
}
