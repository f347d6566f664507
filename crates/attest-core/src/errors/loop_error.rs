//! Top-level error aggregating every subsystem via `From` conversions.

use super::error_code::AttestErrorCode;
use super::{
    AggregationError, ConfigError, ExtractionError, GenerationError, OrchestrationError,
    SnapshotError, VerificationError,
};

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl AttestErrorCode for LoopError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Generation(e) => e.error_code(),
            Self::Extraction(e) => e.error_code(),
            Self::Verification(e) => e.error_code(),
            Self::Aggregation(e) => e.error_code(),
            Self::Orchestration(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Snapshot(e) => e.error_code(),
        }
    }
}

impl LoopError {
    /// Whether this error must abort the run immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Aggregation(_) | Self::Config(_))
    }
}
