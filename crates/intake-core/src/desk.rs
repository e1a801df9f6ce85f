//! Wiring between the selection surface, the state machine, and the
//! process-scoped notification and ledger stores.
//!
//! # Design
//! - Each `submit` runs its own [`UploadSession`]; overlapping submissions are
//!   independent and settle in whatever order their transports finish.
//! - Settle handling is a single synchronous step: ledger append (accepted
//!   only), notification raise, event publish.
//! - The uploading indicator is an in-flight counter released by a guard, so a
//!   dropped submission future still resets it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use intake_events::{EventBus, IntakeEvent};
use tracing::info;
use uuid::Uuid;

use crate::error::SessionResult;
use crate::ledger::UploadLedger;
use crate::messages;
use crate::model::{RejectionKind, SelectedFile, Selection, UploadOutcome, ValidationPolicy};
use crate::notify::{NotificationChannel, NotificationKind};
use crate::session::UploadSession;
use crate::transport::Transport;

/// The upload widget's controller.
#[derive(Clone)]
pub struct IntakeDesk {
    policy: Arc<ValidationPolicy>,
    transport: Arc<dyn Transport>,
    notifications: NotificationChannel,
    ledger: UploadLedger,
    events: EventBus,
    in_flight: Arc<AtomicUsize>,
}

impl IntakeDesk {
    /// Desk with empty stores and default notification windows.
    #[must_use]
    pub fn new(policy: ValidationPolicy, transport: Arc<dyn Transport>) -> Self {
        Self {
            policy: Arc::new(policy),
            transport,
            notifications: NotificationChannel::default(),
            ledger: UploadLedger::new(),
            events: EventBus::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Use a specific notification channel.
    #[must_use]
    pub fn with_notifications(mut self, notifications: NotificationChannel) -> Self {
        self.notifications = notifications;
        self
    }

    /// Policy applied to every candidate.
    #[must_use]
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Label of the configured transport.
    #[must_use]
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Notification slot.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    /// Accepted uploads.
    #[must_use]
    pub const fn ledger(&self) -> &UploadLedger {
        &self.ledger
    }

    /// Lifecycle event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Whether any submission is currently in its transport call.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.in_flight() > 0
    }

    /// Number of submissions currently in their transport call.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submit a single file.
    ///
    /// # Errors
    ///
    /// See [`IntakeDesk::submit`].
    pub async fn submit_file(&self, file: SelectedFile) -> SessionResult<UploadOutcome> {
        let mut session = UploadSession::new();
        session.select(Selection::single(file))?;
        self.drive(session).await
    }

    /// Run one selection through validation and the transport, then apply the
    /// outcome to the ledger and notification channel. Returns `None` when the
    /// selection carried no file.
    ///
    /// # Errors
    ///
    /// Only reports state machine misuse, which a fresh session never hits;
    /// upload failures come back as rejected outcomes.
    pub async fn submit(&self, selection: Selection) -> SessionResult<Option<UploadOutcome>> {
        let mut session = UploadSession::new();
        if !session.select(selection)? {
            return Ok(None);
        }
        self.drive(session).await.map(Some)
    }

    /// Settle a selection whose file could not be opened. The rejection goes
    /// through the same notification, event, and logging path as any other
    /// outcome; the transport is never called.
    pub fn reject_unreadable(
        &self,
        filename: impl Into<String>,
        reason: impl Into<String>,
    ) -> UploadOutcome {
        let submission_id = Uuid::new_v4();
        let _ = self.events.publish(IntakeEvent::SubmissionStarted {
            submission_id,
            filename: filename.into(),
        });
        let outcome = UploadOutcome::rejected(RejectionKind::Unreadable, reason);
        self.apply(submission_id, &outcome);
        outcome
    }

    async fn drive(&self, mut session: UploadSession) -> SessionResult<UploadOutcome> {
        let filename = session
            .candidate()
            .map(|candidate| candidate.name.clone())
            .unwrap_or_default();
        let _ = self.events.publish(IntakeEvent::SubmissionStarted {
            submission_id: session.id(),
            filename,
        });

        let outcome = match session.validate(&self.policy)? {
            Some(rejected) => rejected,
            None => {
                let _uploading = InFlightGuard::enter(&self.in_flight);
                let _ = self.events.publish(IntakeEvent::UploadStarted {
                    submission_id: session.id(),
                    transport: self.transport.name().to_string(),
                });
                session.upload(self.transport.as_ref()).await?
            }
        };

        self.apply(session.id(), &outcome);
        Ok(outcome)
    }

    fn apply(&self, submission_id: Uuid, outcome: &UploadOutcome) {
        let (kind, message, event) = match outcome {
            UploadOutcome::Accepted(entry) => {
                self.ledger.append(entry.clone());
                (
                    NotificationKind::Success,
                    messages::upload_succeeded(&entry.filename),
                    IntakeEvent::UploadAccepted {
                        submission_id,
                        filename: entry.filename.clone(),
                        byte_size: entry.byte_size,
                        content_type: entry.content_type.clone(),
                    },
                )
            }
            UploadOutcome::Rejected(rejection) => (
                NotificationKind::Error,
                rejection.reason.clone(),
                IntakeEvent::UploadRejected {
                    submission_id,
                    kind: rejection.kind.as_str().to_string(),
                    reason: rejection.reason.clone(),
                },
            ),
        };

        info!(
            %submission_id,
            outcome = outcome.label(),
            ledger_len = self.ledger.len(),
            "submission settled"
        );
        let _ = self.events.publish(event);
        let _ = self.notifications.raise(kind, message.clone());
        let _ = self.events.publish(IntakeEvent::NotificationRaised {
            kind: kind.as_str().to_string(),
            message,
        });
    }
}

struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
