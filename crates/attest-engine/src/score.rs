//! Aggregator: verdicts to a compliance score and a severity-weighted gap.
//!
//! Pure functions over the inputs; no I/O and no hidden state.

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};

use attest_core::config::ScoreConfig;
use attest_core::errors::AggregationError;
use attest_core::models::{Claim, ClaimVerification, Severity, Verdict, VerificationSummary};

/// `100 * (pass + 0.5 * partial) / (pass + partial + fail)`; 100 when
/// nothing is scoreable.
pub fn compliance_score(pass: usize, partial: usize, fail: usize) -> f64 {
    let denominator = pass + partial + fail;
    if denominator == 0 {
        return 100.0;
    }
    100.0 * (pass as f64 + 0.5 * partial as f64) / denominator as f64
}

/// Severity-weighted unmet fraction over non-N/A verdicts; 0 when nothing
/// is scoreable.
pub fn specification_gap<I>(verdicts: I) -> f64
where
    I: IntoIterator<Item = (Severity, Verdict)>,
{
    let mut weighted_unmet = 0.0;
    let mut total_weight = 0.0;
    for (severity, verdict) in verdicts {
        let Some(value) = verdict.value() else {
            continue;
        };
        let weight = severity.weight();
        weighted_unmet += weight * (1.0 - value);
        total_weight += weight;
    }
    if total_weight == 0.0 {
        return 0.0;
    }
    weighted_unmet / total_weight
}

/// Issue ranking: severity weight desc, evidence confidence asc, claim id.
pub fn rank_issues(a: (&Claim, &ClaimVerification), b: (&Claim, &ClaimVerification)) -> Ordering {
    b.0.severity
        .cmp(&a.0.severity)
        .then_with(|| a.1.max_confidence().total_cmp(&b.1.max_confidence()))
        .then_with(|| a.0.id.cmp(&b.0.id))
}

#[derive(Debug, Clone)]
pub struct Scorer {
    top_issues_limit: usize,
}

impl Scorer {
    pub fn new(config: &ScoreConfig) -> Self {
        Self {
            top_issues_limit: config.top_issues_limit,
        }
    }

    pub fn top_issues_limit(&self) -> usize {
        self.top_issues_limit
    }

    /// Aggregate one iteration's verifications.
    ///
    /// `claims` is every claim known to the run, untestable ones included;
    /// they are retained for audit but never scored. Each verification must
    /// reference a distinct testable claim.
    pub fn score(
        &self,
        claims: &[Claim],
        verifications: Vec<ClaimVerification>,
    ) -> Result<VerificationSummary, AggregationError> {
        let by_id: FxHashMap<&str, &Claim> = claims
            .iter()
            .filter(|c| c.testable)
            .map(|c| (c.id.as_str(), c))
            .collect();

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let (mut pass, mut fail, mut partial, mut na, mut checker_errors) = (0, 0, 0, 0, 0);
        let mut weighted = Vec::with_capacity(verifications.len());

        for v in &verifications {
            let Some(claim) = by_id.get(v.claim_id.as_str()) else {
                return Err(AggregationError::UnknownClaim {
                    claim_id: v.claim_id.clone(),
                });
            };
            if !seen.insert(v.claim_id.as_str()) {
                return Err(AggregationError::DuplicateVerification {
                    claim_id: v.claim_id.clone(),
                });
            }
            match v.verdict {
                Verdict::Pass => pass += 1,
                Verdict::Fail => fail += 1,
                Verdict::Partial => partial += 1,
                Verdict::NotApplicable => {
                    na += 1;
                    if v.is_checker_error() {
                        checker_errors += 1;
                    }
                }
            }
            weighted.push((claim.severity, v.verdict));
        }

        let total = verifications.len();
        if pass + fail + partial + na != total {
            return Err(AggregationError::CountMismatch {
                pass,
                fail,
                partial,
                na,
                total,
            });
        }

        let compliance = compliance_score(pass, partial, fail);
        let gap = specification_gap(weighted);
        check_range("compliance_score", compliance, 100.0)?;
        check_range("specification_gap", gap, 1.0)?;

        let critical_fails = verifications
            .iter()
            .filter(|v| v.verdict == Verdict::Fail)
            .filter(|v| by_id.get(v.claim_id.as_str()).map(|c| c.severity) == Some(Severity::Critical))
            .cloned()
            .collect();

        let mut issues: Vec<(&Claim, &ClaimVerification)> = verifications
            .iter()
            .filter(|v| v.verdict.is_unmet())
            .filter_map(|v| by_id.get(v.claim_id.as_str()).map(|c| (*c, v)))
            .collect();
        issues.sort_by(|a, b| rank_issues(*a, *b));
        let top_issues = issues
            .into_iter()
            .take(self.top_issues_limit)
            .map(|(_, v)| v.clone())
            .collect();

        Ok(VerificationSummary {
            compliance_score: compliance,
            specification_gap: gap,
            total_claims: total,
            pass_count: pass,
            fail_count: fail,
            partial_count: partial,
            na_count: na,
            checker_errors,
            critical_fails,
            top_issues,
            verifications,
            claims: claims.to_vec(),
        })
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ScoreConfig::default())
    }
}

fn check_range(field: &str, value: f64, max: f64) -> Result<(), AggregationError> {
    if value.is_nan() || !(0.0..=max).contains(&value) {
        return Err(AggregationError::ScoreOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}
