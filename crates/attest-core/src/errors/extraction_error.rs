//! Extraction errors.

use super::error_code::{self, AttestErrorCode};

/// Raised when non-empty generator output yields no parsable claim.
/// Recoverable: the orchestrator may regenerate or continue with zero
/// new claims.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no claims could be parsed from {input_len} bytes ({dropped} fragments dropped)")]
    NoClaims { input_len: usize, dropped: usize },
}

impl AttestErrorCode for ExtractionError {
    fn error_code(&self) -> &'static str {
        error_code::EXTRACTION_ERROR
    }
}
