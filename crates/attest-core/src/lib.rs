//! # attest-core
//!
//! Foundation crate for the attest claim-verification loop.
//! Defines the shared data model, collaborator traits, errors, config,
//! events, tracing setup, and constants. The engine crate depends on this.

pub mod cancellation;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod models;
pub mod traits;
pub mod tracing;

// Re-export the most commonly used types at the crate root.
pub use cancellation::CancellationToken;
pub use config::AttestConfig;
pub use errors::{AttestErrorCode, LoopError};
pub use models::{
    Claim, ClaimCategory, ClaimVerification, Evidence, RemediationAction, RemediationItem,
    Severity, Verdict, VerificationSummary,
};
