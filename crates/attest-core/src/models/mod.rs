//! Shared data model: claims, evidence, verdicts, summaries, remediation,
//! iteration records, and codebase snapshots.

pub mod claim;
pub mod iteration;
pub mod remediation;
pub mod snapshot;
pub mod summary;
pub mod usage;
pub mod verification;

pub use claim::{Claim, ClaimCategory, Severity};
pub use iteration::{IterationDelta, IterationDiagnostics, IterationRecord};
pub use remediation::{RemediationAction, RemediationItem};
pub use snapshot::{CodebaseSnapshot, ScanMode, SourceFile};
pub use summary::VerificationSummary;
pub use usage::TokenUsage;
pub use verification::{ClaimVerification, Evidence, Verdict};
