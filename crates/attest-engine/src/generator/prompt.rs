//! Prompt construction for model-backed generators.

use std::fmt::Write as _;

use attest_core::models::{ClaimCategory, Severity};
use attest_core::traits::GenerationRequest;

const INSTRUCTIONS: &str = "\
You are auditing a codebase. List discrete, individually checkable behavioral \
claims the code is expected to satisfy. One claim per bullet line, grouped \
under `## Section` headings. Prefix each claim with a severity tag and a \
category tag, for example `- [high] [security] Passwords are hashed with bcrypt`. \
Mark claims that cannot be checked against source code with `[untestable]`. \
Reference concrete identifiers in backticks where possible.";

/// Rough token estimate (4 bytes per token).
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64).div_ceil(4)
}

/// Build the generation prompt. Source content is included file by file
/// until `max_source_bytes` would be exceeded.
pub fn build_prompt(request: &GenerationRequest, max_source_bytes: usize) -> String {
    let mut out = String::new();
    out.push_str(INSTRUCTIONS);
    let _ = write!(
        out,
        "\n\nSeverities: {}.\nCategories: {}.\n",
        Severity::ALL.map(Severity::as_str).join(", "),
        ClaimCategory::ALL.map(ClaimCategory::as_str).join(", "),
    );
    let _ = writeln!(
        out,
        "Iteration: {}\nDocumentation source: {}",
        request.iteration, request.doc_source
    );
    if let Some(language) = request.snapshot.primary_language() {
        let _ = writeln!(out, "Primary language: {language}");
    }

    if let Some(prior) = &request.prior_summary {
        let _ = writeln!(
            out,
            "\nPrevious iteration: compliance {:.1}, gap {:.3}, {} unmet of {} claims.",
            prior.compliance_score,
            prior.specification_gap,
            prior.unmet_count(),
            prior.total_claims
        );
        if !prior.top_issues.is_empty() {
            out.push_str("Open issues (re-check these, keep their wording):\n");
            for issue in &prior.top_issues {
                let text = prior
                    .claim(&issue.claim_id)
                    .map_or(issue.claim_id.as_str(), |c| c.text.as_str());
                let _ = writeln!(out, "- [{}] {} ({})", issue.verdict, text, issue.reasoning);
            }
        }
    }

    out.push_str("\nSource files:\n");
    let mut budget = max_source_bytes;
    let mut omitted = 0usize;
    for file in request.snapshot.targets() {
        let header = format!("\n### {}\n", file.display_path());
        let cost = header.len() + file.content.len() + 8;
        if cost > budget {
            omitted += 1;
            continue;
        }
        budget -= cost;
        out.push_str(&header);
        out.push_str("```\n");
        out.push_str(&file.content);
        out.push_str("\n```\n");
    }
    if omitted > 0 {
        let _ = writeln!(out, "\n({omitted} files omitted for length)");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use attest_core::models::CodebaseSnapshot;

    #[test]
    fn prompt_respects_source_budget() {
        let snapshot = CodebaseSnapshot::from_sources(
            "/r",
            [("a.py", "x = 1".to_string()), ("b.py", "y".repeat(500))],
        );
        let request = GenerationRequest {
            iteration: 2,
            snapshot: Arc::new(snapshot),
            prior_summary: None,
            doc_source: "SPEC.md".to_string(),
        };
        let prompt = build_prompt(&request, 100);
        assert!(prompt.contains("### a.py"));
        assert!(!prompt.contains("### b.py"));
        assert!(prompt.contains("1 files omitted"));
        assert!(prompt.contains("Primary language: python"));
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
