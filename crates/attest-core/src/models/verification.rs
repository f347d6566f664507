use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{NOT_APPLICABLE_PREFIX, VERIFICATION_ERROR_PREFIX};
use crate::errors::VerificationError;

/// Outcome of checking one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "PARTIAL")]
    Partial,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Verdict {
    /// Satisfaction value used by the gap; `None` for N/A.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Pass => Some(1.0),
            Self::Partial => Some(0.5),
            Self::Fail => Some(0.0),
            Self::NotApplicable => None,
        }
    }

    /// FAIL or PARTIAL.
    pub fn is_unmet(self) -> bool {
        matches!(self, Self::Fail | Self::Partial)
    }

    /// Higher is more conservative. Used to break majority-vote ties.
    pub fn strictness(self) -> u8 {
        match self {
            Self::Fail => 3,
            Self::Partial => 2,
            Self::NotApplicable => 1,
            Self::Pass => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Partial => "PARTIAL",
            Self::Fail => "FAIL",
            Self::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" | "passed" | "holds" => Ok(Self::Pass),
            "partial" => Ok(Self::Partial),
            "fail" | "failed" => Ok(Self::Fail),
            "n/a" | "na" | "not_applicable" | "not-applicable" => Ok(Self::NotApplicable),
            other => Err(format!("unknown verdict: {other}")),
        }
    }
}

/// Concrete support for a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default)]
    pub snippet: String,
    /// Clamped to [0, 1].
    pub confidence: f64,
}

impl Evidence {
    pub fn new(
        file: impl Into<String>,
        line_number: Option<u32>,
        snippet: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            file: file.into(),
            line_number,
            snippet: snippet.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    /// `file:line` or just `file`.
    pub fn location(&self) -> String {
        match self.line_number {
            Some(line) => format!("{}:{line}", self.file),
            None => self.file.clone(),
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Result of checking one claim against one codebase snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimVerification {
    pub claim_id: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub reasoning: String,
    /// Set only when an N/A verdict stems from a tooling failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checker_error: Option<String>,
}

impl ClaimVerification {
    pub fn new(
        claim_id: impl Into<String>,
        verdict: Verdict,
        evidence: Vec<Evidence>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            claim_id: claim_id.into(),
            verdict,
            evidence,
            reasoning: reasoning.into(),
            checker_error: None,
        }
    }

    /// N/A verdict recording a checker failure.
    pub fn checker_failure(claim_id: impl Into<String>, error: &VerificationError) -> Self {
        Self {
            claim_id: claim_id.into(),
            verdict: Verdict::NotApplicable,
            evidence: Vec::new(),
            reasoning: format!("{VERIFICATION_ERROR_PREFIX} {error}"),
            checker_error: Some(error.to_string()),
        }
    }

    /// Highest evidence confidence, 0.0 without evidence.
    pub fn max_confidence(&self) -> f64 {
        self.evidence
            .iter()
            .map(|e| e.confidence)
            .fold(0.0, f64::max)
    }

    pub fn is_checker_error(&self) -> bool {
        self.checker_error.is_some()
    }

    /// Whether the verdict satisfies the evidence contract for `floor`.
    pub fn satisfies_contract(&self, floor: f64) -> bool {
        match self.verdict {
            Verdict::Pass => !self.evidence.is_empty() && self.max_confidence() >= floor,
            Verdict::NotApplicable => {
                self.evidence.is_empty() || self.reasoning.starts_with(NOT_APPLICABLE_PREFIX)
            }
            Verdict::Partial | Verdict::Fail => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_wire_names() {
        let json = serde_json::to_string(&Verdict::NotApplicable).unwrap();
        assert_eq!(json, "\"N/A\"");
        let back: Verdict = serde_json::from_str("\"PARTIAL\"").unwrap();
        assert_eq!(back, Verdict::Partial);
    }

    #[test]
    fn evidence_confidence_is_clamped() {
        assert_eq!(Evidence::new("a.rs", None, "", 1.7).confidence, 1.0);
        assert_eq!(Evidence::new("a.rs", None, "", -0.2).confidence, 0.0);
        assert_eq!(Evidence::new("a.rs", None, "", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn pass_without_evidence_breaks_contract() {
        let v = ClaimVerification::new("c-1", Verdict::Pass, vec![], "looks fine");
        assert!(!v.satisfies_contract(0.5));
        let v = ClaimVerification::new(
            "c-1",
            Verdict::Pass,
            vec![Evidence::new("src/lib.rs", Some(3), "fn ok()", 0.9)],
            "found",
        );
        assert!(v.satisfies_contract(0.5));
        assert!(!v.satisfies_contract(0.95));
    }

    #[test]
    fn checker_failure_is_flagged() {
        let err = VerificationError::CheckerFailed {
            checker: "pattern".into(),
            claim_id: "c-1".into(),
            reason: "boom".into(),
        };
        let v = ClaimVerification::checker_failure("c-1", &err);
        assert_eq!(v.verdict, Verdict::NotApplicable);
        assert!(v.is_checker_error());
        assert!(v.reasoning.starts_with(VERIFICATION_ERROR_PREFIX));
        assert!(v.evidence.is_empty());
    }
}
