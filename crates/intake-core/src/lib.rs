#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! Single-file upload intake: validation, submission state machine, transient
//! notifications, and the ledger of accepted uploads.
//!
//! Layout: `model.rs` (candidate/outcome/policy types), `validate.rs` (policy
//! checks), `transport.rs` (transport capability + simulated variant),
//! `session.rs` (per-submission state machine), `notify.rs` (notification
//! channel), `ledger.rs` (accepted uploads), `desk.rs` (wiring used by the
//! selection surface), `messages.rs` (user-facing text).

pub mod desk;
pub mod error;
pub mod ledger;
pub mod messages;
pub mod model;
pub mod notify;
pub mod session;
pub mod transport;
pub mod validate;

pub use desk::IntakeDesk;
pub use error::{SessionError, SessionResult};
pub use ledger::UploadLedger;
pub use model::{
    CandidateFile, DEFAULT_ALLOWED_MEDIA_TYPES, DEFAULT_MAX_BYTE_SIZE, FilePayload, LedgerEntry, Rejection, RejectionKind,
    SelectedFile, Selection, UploadOutcome, ValidationPolicy, media_type_for_path,
};
pub use notify::{Notification, NotificationChannel, NotificationKind, NotificationWindows};
pub use session::{SessionState, UploadSession};
pub use transport::{DEFAULT_SIMULATED_DELAY, SimulatedTransport, Transport};
pub use validate::validate;
