//! Wire-level report for CI/automation consumers, and a plain-text console
//! rendering of a run.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use attest_core::errors::{AggregationError, AttestErrorCode};
use attest_core::models::{Claim, ClaimVerification, RemediationItem, VerificationSummary};

use crate::orchestrator::{RunReport, RunUsage};
use crate::score::Scorer;

/// Language reported when the snapshot had no recognised source files.
const UNKNOWN_LANGUAGE: &str = "unknown";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("malformed report: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("report does not aggregate: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("report declares {field} = {declared}, items give {computed}")]
    CountMismatch {
        field: &'static str,
        declared: usize,
        computed: usize,
    },
}

impl AttestErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) | Self::CountMismatch { .. } => "REPORT_ERROR",
            Self::Aggregation(e) => e.error_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsSection {
    pub count: usize,
    pub items: Vec<Claim>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSection {
    pub passed: usize,
    pub failed: usize,
    pub partial: usize,
    pub total: usize,
    pub items: Vec<ClaimVerification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationSection {
    pub count: usize,
    pub items: Vec<RemediationItem>,
}

/// The report contract consumed by CI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReport {
    pub request_id: String,
    /// Termination reason, e.g. `CONVERGED` or `BUDGET_EXHAUSTED`.
    pub code: String,
    pub language: String,
    pub claims: ClaimsSection,
    pub verification: VerificationSection,
    pub remediation: RemediationSection,
    pub usage: RunUsage,
}

impl WireReport {
    pub fn from_summary(
        request_id: impl Into<String>,
        code: impl Into<String>,
        language: impl Into<String>,
        summary: &VerificationSummary,
        remediation: &[RemediationItem],
        usage: RunUsage,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            code: code.into(),
            language: language.into(),
            claims: ClaimsSection {
                count: summary.claims.len(),
                items: summary.claims.clone(),
            },
            verification: VerificationSection {
                passed: summary.pass_count,
                failed: summary.fail_count,
                partial: summary.partial_count,
                total: summary.total_claims,
                items: summary.verifications.clone(),
            },
            remediation: RemediationSection {
                count: remediation.len(),
                items: remediation.to_vec(),
            },
            usage,
        }
    }

    /// Wire form of a finished run. A run with no completed iteration
    /// reports empty sections.
    pub fn from_run(run: &RunReport) -> Self {
        let language = run.language.as_deref().unwrap_or(UNKNOWN_LANGUAGE);
        match &run.final_summary {
            Some(summary) => Self::from_summary(
                &run.run_id,
                run.termination.as_str(),
                language,
                summary,
                &run.remediation,
                run.usage,
            ),
            None => Self {
                request_id: run.run_id.clone(),
                code: run.termination.as_str().to_string(),
                language: language.to_string(),
                claims: ClaimsSection {
                    count: 0,
                    items: Vec::new(),
                },
                verification: VerificationSection {
                    passed: 0,
                    failed: 0,
                    partial: 0,
                    total: 0,
                    items: Vec::new(),
                },
                remediation: RemediationSection {
                    count: 0,
                    items: Vec::new(),
                },
                usage: run.usage,
            },
        }
    }

    pub fn parse(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild the summary by re-aggregating the items, then check the
    /// declared counts against it.
    pub fn to_summary(&self, scorer: &Scorer) -> Result<VerificationSummary, ReportError> {
        let summary = scorer.score(&self.claims.items, self.verification.items.clone())?;
        let checks = [
            ("claims.count", self.claims.count, self.claims.items.len()),
            ("verification.passed", self.verification.passed, summary.pass_count),
            ("verification.failed", self.verification.failed, summary.fail_count),
            ("verification.partial", self.verification.partial, summary.partial_count),
            ("verification.total", self.verification.total, summary.total_claims),
            ("remediation.count", self.remediation.count, self.remediation.items.len()),
        ];
        for (field, declared, computed) in checks {
            if declared != computed {
                return Err(ReportError::CountMismatch {
                    field,
                    declared,
                    computed,
                });
            }
        }
        Ok(summary)
    }
}

/// Plain-text run summary for CI logs.
pub fn render_console(run: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "attest run {}: {} after {} iteration(s){}",
        run.run_id,
        run.termination,
        run.iterations.len(),
        if run.complete { "" } else { " (incomplete)" }
    );
    if let Some(failure) = &run.failure {
        let phase = run.failed_phase.map(|p| p.to_string()).unwrap_or_default();
        let _ = writeln!(out, "  failure ({phase}): {failure}");
    }
    if let Some(error) = &run.termination_error {
        let _ = writeln!(out, "  {}", error.coded_string());
    }

    let Some(summary) = &run.final_summary else {
        out.push_str("  no iteration completed\n");
        return out;
    };
    let _ = writeln!(
        out,
        "  compliance {:.1}  gap {:.1}%",
        summary.compliance_score,
        summary.specification_gap * 100.0
    );
    let _ = writeln!(
        out,
        "  claims {}: {} pass, {} partial, {} fail, {} n/a ({} checker errors)",
        summary.total_claims,
        summary.pass_count,
        summary.partial_count,
        summary.fail_count,
        summary.na_count,
        summary.checker_errors
    );
    if !summary.critical_fails.is_empty() {
        let _ = writeln!(out, "  critical failures: {}", summary.critical_fails.len());
    }

    if !run.remediation.is_empty() {
        out.push_str("  remediation:\n");
        for (i, item) in run.remediation.iter().take(10).enumerate() {
            let _ = writeln!(
                out,
                "    {}. [{}] [{}] {}",
                i + 1,
                item.severity,
                item.action,
                item.title
            );
        }
        if run.remediation.len() > 10 {
            let _ = writeln!(out, "    ... {} more", run.remediation.len() - 10);
        }
    }
    let _ = writeln!(
        out,
        "  usage: {} in / {} out tokens, {} pipeline calls, {} ms",
        run.usage.input_tokens, run.usage.output_tokens, run.usage.pipeline_calls, run.usage.duration_ms
    );
    out
}
