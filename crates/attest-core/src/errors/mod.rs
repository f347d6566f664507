//! Error handling for attest.
//! One error enum per subsystem, `thiserror` only.

pub mod aggregation_error;
pub mod config_error;
pub mod error_code;
pub mod extraction_error;
pub mod generation_error;
pub mod loop_error;
pub mod orchestration_error;
pub mod snapshot_error;
pub mod verification_error;

pub use aggregation_error::AggregationError;
pub use config_error::ConfigError;
pub use error_code::AttestErrorCode;
pub use extraction_error::ExtractionError;
pub use generation_error::GenerationError;
pub use loop_error::LoopError;
pub use orchestration_error::OrchestrationError;
pub use snapshot_error::SnapshotError;
pub use verification_error::VerificationError;
