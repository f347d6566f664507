//! Generation errors.

use super::error_code::{self, AttestErrorCode};

/// Failures of the external text-generation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("generator returned an empty response")]
    EmptyResponse,

    #[error("provider error: {reason}")]
    Provider { reason: String },

    #[error("generator {name} is unavailable")]
    Unavailable { name: String },
}

impl AttestErrorCode for GenerationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::GENERATION_TIMEOUT,
            _ => error_code::GENERATION_ERROR,
        }
    }
}
