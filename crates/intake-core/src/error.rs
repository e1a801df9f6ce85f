//! Error types for the submission state machine.

use thiserror::Error;

/// Misuse of an [`UploadSession`](crate::UploadSession).
///
/// Upload failures are never errors; they settle as rejected outcomes. These
/// variants only report operations invoked out of order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The operation is not valid from the session's current state.
    #[error("invalid session transition")]
    InvalidTransition {
        /// State label the session was in.
        state: &'static str,
        /// Operation that was attempted.
        operation: &'static str,
    },
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;
