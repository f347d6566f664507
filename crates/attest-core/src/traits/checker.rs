use crate::errors::VerificationError;
use crate::models::{Claim, CodebaseSnapshot, Evidence, Verdict};

/// Raw result of one checker invocation, before contract normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    pub evidence: Vec<Evidence>,
    pub reasoning: String,
}

impl CheckOutcome {
    pub fn new(verdict: Verdict, evidence: Vec<Evidence>, reasoning: impl Into<String>) -> Self {
        Self {
            verdict,
            evidence,
            reasoning: reasoning.into(),
        }
    }
}

/// Opaque per-claim checker (static analysis, pattern search, or a model call).
///
/// Each call is an independent, side-effect-free read of the snapshot.
/// Implementations need not be deterministic; the verifier enforces that.
pub trait ClaimChecker: Send + Sync {
    fn check(
        &self,
        claim: &Claim,
        snapshot: &CodebaseSnapshot,
    ) -> Result<CheckOutcome, VerificationError>;

    fn name(&self) -> &str;
}
