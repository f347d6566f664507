//! # attest-engine
//!
//! The claim-verification loop.
//!
//! ## Phases
//! 1. **Generate**: a pluggable [`ClaimGenerator`](attest_core::traits::ClaimGenerator) produces raw claim text
//! 2. **Extract**: raw text becomes deduplicated, stably identified claims
//! 3. **Verify**: a bounded worker pool runs the per-claim checker
//! 4. **Score**: verdicts reduce to a compliance score and a weighted gap
//! 5. **Remediate**: unmet claims become ranked advisory fixes
//!
//! The [`Orchestrator`] repeats the cycle until the gap converges, the
//! budget runs out, progress stalls, or generation fails.

pub mod checker;
pub mod extract;
pub mod generator;
pub mod orchestrator;
pub mod remediation;
pub mod report;
pub mod score;
pub mod snapshot;
pub mod store;
pub mod verify;

pub use extract::{Extraction, Extractor};
pub use orchestrator::{Orchestrator, Phase, RunReport, TerminationReason};
pub use remediation::RemediationPlanner;
pub use report::WireReport;
pub use score::Scorer;
pub use store::ClaimRegistry;
pub use verify::Verifier;
