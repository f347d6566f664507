//! Per-claim verification errors. Contained: absorbed into an N/A verdict.

use super::error_code::{self, AttestErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerificationError {
    #[error("checker {checker} failed on claim {claim_id}: {reason}")]
    CheckerFailed {
        checker: String,
        claim_id: String,
        reason: String,
    },

    #[error("checker {checker} panicked on claim {claim_id}: {message}")]
    CheckerPanic {
        checker: String,
        claim_id: String,
        message: String,
    },
}

impl AttestErrorCode for VerificationError {
    fn error_code(&self) -> &'static str {
        error_code::VERIFICATION_ERROR
    }
}
