use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::summary::VerificationSummary;
use super::verification::Verdict;

/// Per-iteration counters for operators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationDiagnostics {
    /// Claims first seen in this iteration.
    pub new_claims: usize,
    /// Extracted claims matched to an already registered claim.
    pub carried_forward: usize,
    /// Malformed fragments dropped by the extractor.
    pub dropped_fragments: usize,
    /// Fragments collapsed into an earlier fragment of the same response.
    #[serde(default)]
    pub duplicate_fragments: usize,
    /// Severity/category tags the extractor did not recognise.
    #[serde(default)]
    pub unknown_tags: usize,
    /// Generator attempts, including retries.
    pub generation_attempts: u32,
    /// Set when extraction failed and the iteration ran on known claims only.
    pub extraction_failed: bool,
    /// N/A verdicts caused by checker failures.
    pub checker_errors: usize,
    /// Checker invocations (cache hits excluded).
    pub checker_calls: usize,
}

/// Verdict movement against the previous iteration, keyed by claim id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationDelta {
    /// Previously unmet (or unseen) claims that now pass.
    pub newly_passing: Vec<String>,
    /// Previously passing claims that are now FAIL or PARTIAL.
    pub regressed: Vec<String>,
    /// Claims verified for the first time.
    pub first_seen: Vec<String>,
    /// Claims whose verdict did not change.
    pub unchanged: usize,
}

impl IterationDelta {
    /// Compare two summaries. `previous` is `None` on the first iteration.
    pub fn between(previous: Option<&VerificationSummary>, current: &VerificationSummary) -> Self {
        let mut delta = Self::default();
        for verification in &current.verifications {
            let before = previous.and_then(|p| p.verdict_of(&verification.claim_id));
            match before {
                None => {
                    delta.first_seen.push(verification.claim_id.clone());
                    if verification.verdict == Verdict::Pass && previous.is_some() {
                        delta.newly_passing.push(verification.claim_id.clone());
                    }
                }
                Some(old) if old == verification.verdict => delta.unchanged += 1,
                Some(old) => {
                    if verification.verdict == Verdict::Pass {
                        delta.newly_passing.push(verification.claim_id.clone());
                    } else if old == Verdict::Pass && verification.verdict.is_unmet() {
                        delta.regressed.push(verification.claim_id.clone());
                    }
                }
            }
        }
        delta
    }
}

/// Immutable snapshot of one loop cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration index.
    pub iteration: u32,
    pub summary: VerificationSummary,
    /// Specification gap of this iteration (mirrors the summary).
    pub gap: f64,
    pub timestamp: DateTime<Utc>,
    /// Whether the run terminated after this iteration.
    pub terminal: bool,
    pub diagnostics: IterationDiagnostics,
    pub delta: IterationDelta,
}
