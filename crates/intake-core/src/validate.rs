//! Type and size checks applied to a candidate before any transport call.

use crate::messages;
use crate::model::{CandidateFile, Rejection, RejectionKind, ValidationPolicy};

/// Decide whether `candidate` may proceed under `policy`.
///
/// The media type is checked before the size, so a file violating both is
/// reported as an unsupported format. The size limit is inclusive.
///
/// # Errors
///
/// Returns the first violated rule as a [`Rejection`].
pub fn validate(candidate: &CandidateFile, policy: &ValidationPolicy) -> Result<(), Rejection> {
    if !policy.allows(&candidate.declared_media_type) {
        return Err(Rejection::new(
            RejectionKind::UnsupportedFormat,
            messages::UNSUPPORTED_FORMAT,
        ));
    }
    if candidate.byte_size > policy.max_byte_size() {
        return Err(Rejection::new(
            RejectionKind::SizeExceeded,
            messages::size_exceeded(policy.max_byte_size()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_MAX_BYTE_SIZE;

    fn candidate(media_type: &str, byte_size: u64) -> CandidateFile {
        CandidateFile::new("x", byte_size, media_type)
    }

    #[test]
    fn unsupported_types_are_rejected() {
        let policy = ValidationPolicy::default();
        for media_type in ["application/zip", "text/plain", "", "image/gif"] {
            let err = validate(&candidate(media_type, 10), &policy).expect_err("rejected");
            assert_eq!(err.kind, RejectionKind::UnsupportedFormat);
            assert!(err.reason.contains("지원하지 않는 파일 형식"));
        }
    }

    #[test]
    fn allowed_types_pass() {
        let policy = ValidationPolicy::default();
        for media_type in ["image/png", "image/jpeg", "image/jpg", "application/pdf"] {
            assert!(validate(&candidate(media_type, 1_024), &policy).is_ok());
        }
    }

    #[test]
    fn size_limit_is_inclusive() {
        let policy = ValidationPolicy::default();
        assert!(validate(&candidate("application/pdf", DEFAULT_MAX_BYTE_SIZE), &policy).is_ok());

        let err = validate(&candidate("application/pdf", DEFAULT_MAX_BYTE_SIZE + 1), &policy)
            .expect_err("over the limit");
        assert_eq!(err.kind, RejectionKind::SizeExceeded);
        assert!(err.reason.contains("크기가 50MB를 초과"));
    }

    #[test]
    fn type_violation_wins_over_size_violation() {
        let policy = ValidationPolicy::default();
        let err = validate(&candidate("application/zip", 60 * 1024 * 1024), &policy)
            .expect_err("both rules violated");
        assert_eq!(err.kind, RejectionKind::UnsupportedFormat);
    }

    #[test]
    fn repeated_validation_is_stable() {
        let policy = ValidationPolicy::new(["image/png"], 100);
        let file = candidate("image/png", 101);
        let first = validate(&file, &policy);
        let second = validate(&file, &policy);
        assert_eq!(first, second);
        assert_eq!(policy, ValidationPolicy::new(["image/png"], 100));
    }

    #[test]
    fn custom_limit_shapes_the_message() {
        let policy = ValidationPolicy::new(["image/png"], 2 * 1024 * 1024);
        let err = validate(&candidate("image/png", 3 * 1024 * 1024), &policy).expect_err("too big");
        assert_eq!(err.reason, "파일 크기가 2MB를 초과합니다.");
    }
}
