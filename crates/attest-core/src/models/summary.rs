use serde::{Deserialize, Serialize};

use super::claim::Claim;
use super::verification::{ClaimVerification, Verdict};

/// Aggregate over all verifications of one iteration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    /// Unweighted compliance in [0, 100].
    pub compliance_score: f64,
    /// Severity-weighted fraction of unmet claims in [0, 1].
    pub specification_gap: f64,
    pub total_claims: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub partial_count: usize,
    pub na_count: usize,
    /// N/A verdicts caused by checker failures (subset of `na_count`).
    #[serde(default)]
    pub checker_errors: usize,
    pub critical_fails: Vec<ClaimVerification>,
    pub top_issues: Vec<ClaimVerification>,
    pub verifications: Vec<ClaimVerification>,
    pub claims: Vec<Claim>,
}

impl VerificationSummary {
    /// Whether the count invariant holds.
    pub fn counts_consistent(&self) -> bool {
        self.pass_count + self.fail_count + self.partial_count + self.na_count == self.total_claims
    }

    /// FAIL + PARTIAL.
    pub fn unmet_count(&self) -> usize {
        self.fail_count + self.partial_count
    }

    pub fn claim(&self, id: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.id == id)
    }

    pub fn verification_for(&self, claim_id: &str) -> Option<&ClaimVerification> {
        self.verifications.iter().find(|v| v.claim_id == claim_id)
    }

    pub fn verdict_of(&self, claim_id: &str) -> Option<Verdict> {
        self.verification_for(claim_id).map(|v| v.verdict)
    }
}
