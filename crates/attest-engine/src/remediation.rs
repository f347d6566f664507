//! Remediation planner: one advisory action item per unmet claim.
//!
//! Output only. Nothing here touches the codebase.

use std::fmt::Write as _;

use attest_core::models::{
    Claim, ClaimVerification, RemediationAction, RemediationItem, Verdict, VerificationSummary,
};

use crate::score::rank_issues;

const ADD_PHRASES: &[&str] = &[
    "is missing",
    "are missing",
    "not implemented",
    "does not exist",
    "no implementation",
    "absent",
    "not found",
];

const REMOVE_PHRASES: &[&str] = &[
    "should not exist",
    "should be removed",
    "must be removed",
    "unexpected",
    "forbidden",
    "dead code",
];

const MAX_TITLE_CHARS: usize = 80;

/// Classify the fix an unmet verification calls for. A PARTIAL claim
/// already holds in some cases, so it is always a `modify`.
pub fn classify_action(verdict: Verdict, reasoning: &str) -> RemediationAction {
    if verdict != Verdict::Fail {
        return RemediationAction::Modify;
    }
    let reasoning = reasoning.to_lowercase();
    if REMOVE_PHRASES.iter().any(|p| reasoning.contains(p)) {
        RemediationAction::Remove
    } else if ADD_PHRASES.iter().any(|p| reasoning.contains(p)) {
        RemediationAction::Add
    } else {
        RemediationAction::Modify
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemediationPlanner;

impl RemediationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Items for every FAIL/PARTIAL verification in `summary`, critical
    /// first, then by severity, weakest evidence, claim id.
    pub fn plan(&self, summary: &VerificationSummary) -> Vec<RemediationItem> {
        let mut unmet: Vec<(&Claim, &ClaimVerification)> = summary
            .verifications
            .iter()
            .filter(|v| v.verdict.is_unmet())
            .filter_map(|v| summary.claim(&v.claim_id).map(|c| (c, v)))
            .collect();
        unmet.sort_by(|a, b| rank_issues(*a, *b));
        unmet
            .into_iter()
            .map(|(claim, verification)| item_for(claim, verification))
            .collect()
    }
}

fn item_for(claim: &Claim, verification: &ClaimVerification) -> RemediationItem {
    let action = classify_action(verification.verdict, &verification.reasoning);
    let verb = match action {
        RemediationAction::Add => "Implement",
        RemediationAction::Modify => "Fix",
        RemediationAction::Remove => "Remove",
    };
    RemediationItem {
        claim_id: claim.id.clone(),
        title: format!("{verb}: {}", truncate(&claim.text, MAX_TITLE_CHARS)),
        description: format!(
            "{} {} claim is {}: {}",
            claim.severity, claim.category, verification.verdict, verification.reasoning
        ),
        action,
        severity: claim.severity,
        code_guidance: code_guidance(claim, verification),
    }
}

fn code_guidance(claim: &Claim, verification: &ClaimVerification) -> String {
    if verification.evidence.is_empty() {
        return format!("No evidence located. Start from code related to: {}", claim.text);
    }
    let mut out = String::from("Evidence:");
    for evidence in &verification.evidence {
        let _ = write!(out, "\n- {}", evidence.location());
        if !evidence.snippet.is_empty() {
            let _ = write!(out, ": {}", evidence.snippet);
        }
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
