//! Lexical checker: searches the snapshot for a claim's key terms and
//! backticked symbols with aho-corasick.
//!
//! A stand-in for analyzer-backed checkers. It is deterministic, which makes
//! it useful for offline runs and tests.

use aho_corasick::{AhoCorasick, MatchKind};
use rustc_hash::FxHashSet;

use attest_core::errors::VerificationError;
use attest_core::models::claim::normalize_text;
use attest_core::models::{Claim, CodebaseSnapshot, Evidence, SourceFile, Verdict};
use attest_core::traits::{CheckOutcome, ClaimChecker};

const PASS_COVERAGE: f64 = 0.75;
const PARTIAL_COVERAGE: f64 = 0.4;
const MIN_TERM_LEN: usize = 4;
const MAX_TERMS: usize = 12;
const MAX_EVIDENCE: usize = 3;
const MAX_SNIPPET_CHARS: usize = 160;

/// Words too generic to count as evidence of anything.
const GENERIC_TERMS: &[&str] = &[
    "should", "must", "always", "never", "every", "each", "when", "with", "without", "that",
    "this", "these", "those", "from", "into", "only", "also", "have", "been", "being", "will",
    "does", "code", "codebase", "system", "function", "functions", "method", "methods", "value",
    "values", "returns", "return", "properly", "correctly", "handled", "handles", "ensure",
    "ensures", "using", "used", "uses", "there", "their", "which", "where", "before", "after",
    "other", "than", "then", "they", "them", "such", "some", "more", "most", "least", "over",
];

#[derive(Debug, Clone, Default)]
pub struct PatternChecker;

impl PatternChecker {
    pub fn new() -> Self {
        Self
    }
}

/// Key terms and explicit symbols referenced by a claim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimTerms {
    /// Backticked identifiers, matched case-sensitively.
    pub symbols: Vec<String>,
    /// Lowercase content words, matched case-insensitively.
    pub terms: Vec<String>,
}

/// Pull backticked symbols and key terms out of claim text.
pub fn claim_terms(text: &str) -> ClaimTerms {
    let mut symbols = Vec::new();
    let mut prose = String::with_capacity(text.len());
    for (i, part) in text.split('`').enumerate() {
        // odd segments sit between backticks
        if i % 2 == 1 {
            let symbol = part.trim();
            if !symbol.is_empty() && !symbols.iter().any(|s| s == symbol) {
                symbols.push(symbol.to_string());
            }
        } else {
            prose.push_str(part);
            prose.push(' ');
        }
    }

    let mut seen = FxHashSet::default();
    let terms = normalize_text(&prose)
        .split(' ')
        .filter(|w| w.len() >= MIN_TERM_LEN)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !GENERIC_TERMS.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .take(MAX_TERMS)
        .map(str::to_string)
        .collect();

    ClaimTerms { symbols, terms }
}

struct FileHits<'a> {
    file: &'a SourceFile,
    /// term index -> byte offset of the first match
    first_match: Vec<Option<usize>>,
}

impl FileHits<'_> {
    fn matched(&self) -> usize {
        self.first_match.iter().filter(|m| m.is_some()).count()
    }
}

impl ClaimChecker for PatternChecker {
    fn check(
        &self,
        claim: &Claim,
        snapshot: &CodebaseSnapshot,
    ) -> Result<CheckOutcome, VerificationError> {
        let ClaimTerms { symbols, terms } = claim_terms(&claim.text);
        if symbols.is_empty() && terms.is_empty() {
            return Ok(CheckOutcome::new(
                Verdict::NotApplicable,
                Vec::new(),
                "claim has no searchable terms",
            ));
        }
        let files = snapshot.files();
        if files.is_empty() {
            return Ok(CheckOutcome::new(
                Verdict::NotApplicable,
                Vec::new(),
                "no source files in snapshot",
            ));
        }

        let failed = |reason: String| VerificationError::CheckerFailed {
            checker: self.name().to_string(),
            claim_id: claim.id.clone(),
            reason,
        };

        if !symbols.is_empty() {
            let automaton = AhoCorasick::new(&symbols).map_err(|e| failed(e.to_string()))?;
            let mut found = vec![false; symbols.len()];
            for file in files {
                for m in automaton.find_iter(file.content.as_ref()) {
                    found[m.pattern().as_usize()] = true;
                }
            }
            let missing: Vec<&str> = symbols
                .iter()
                .zip(&found)
                .filter(|(_, hit)| !**hit)
                .map(|(s, _)| s.as_str())
                .collect();
            if !missing.is_empty() {
                return Ok(CheckOutcome::new(
                    Verdict::NotApplicable,
                    Vec::new(),
                    format!("referenced symbols not present: {}", missing.join(", ")),
                ));
            }
        }

        let patterns: Vec<String> = symbols.iter().cloned().chain(terms.iter().cloned()).collect();
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| failed(e.to_string()))?;

        let mut hits: Vec<FileHits<'_>> = files
            .iter()
            .map(|file| {
                let mut first_match = vec![None; patterns.len()];
                for m in automaton.find_iter(file.content.as_ref()) {
                    let slot = &mut first_match[m.pattern().as_usize()];
                    if slot.is_none() {
                        *slot = Some(m.start());
                    }
                }
                FileHits { file, first_match }
            })
            .filter(|h| h.matched() > 0)
            .collect();

        let total = patterns.len();
        let covered: Vec<bool> = (0..total)
            .map(|i| hits.iter().any(|h| h.first_match[i].is_some()))
            .collect();
        let coverage = covered.iter().filter(|c| **c).count() as f64 / total as f64;

        hits.sort_by(|a, b| {
            b.matched()
                .cmp(&a.matched())
                .then_with(|| a.file.path.cmp(&b.file.path))
        });
        let evidence: Vec<Evidence> = hits
            .iter()
            .take(MAX_EVIDENCE)
            .map(|h| evidence_for(h, total))
            .collect();

        let missing: Vec<&str> = patterns
            .iter()
            .zip(&covered)
            .filter(|(_, c)| !**c)
            .map(|(p, _)| p.as_str())
            .collect();

        let outcome = if coverage >= PASS_COVERAGE {
            CheckOutcome::new(
                Verdict::Pass,
                evidence,
                format!("{:.0}% of key terms located", coverage * 100.0),
            )
        } else if coverage >= PARTIAL_COVERAGE {
            CheckOutcome::new(
                Verdict::Partial,
                evidence,
                format!("partially implemented; missing terms: {}", missing.join(", ")),
            )
        } else {
            CheckOutcome::new(
                Verdict::Fail,
                evidence,
                format!("no implementation found for: {}", missing.join(", ")),
            )
        };
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

/// Evidence pointing at a file's earliest match; confidence is the share of
/// patterns that file alone covers.
fn evidence_for(hits: &FileHits<'_>, total: usize) -> Evidence {
    let content = hits.file.content.as_ref();
    let offset = hits.first_match.iter().flatten().min().copied().unwrap_or(0);
    let line_number = content[..offset].bytes().filter(|b| *b == b'\n').count() as u32 + 1;
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = content[offset..]
        .find('\n')
        .map_or(content.len(), |i| offset + i);
    let snippet: String = content[line_start..line_end]
        .trim()
        .chars()
        .take(MAX_SNIPPET_CHARS)
        .collect();
    Evidence::new(
        hits.file.display_path(),
        Some(line_number),
        snippet,
        hits.matched() as f64 / total as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::models::{ClaimCategory, Severity};

    fn claim(text: &str) -> Claim {
        Claim::new("s", ClaimCategory::Security, Severity::High, text)
    }

    fn snapshot() -> CodebaseSnapshot {
        CodebaseSnapshot::from_sources(
            "/r",
            [
                (
                    "src/auth.rs",
                    "use bcrypt::hash;\n\npub fn store_password(p: &str) {\n    let h = hash(p, 12);\n}\n",
                ),
                ("src/limits.rs", "pub struct RateLimiter;\n"),
            ],
        )
    }

    #[test]
    fn extracts_symbols_and_terms() {
        let terms = claim_terms("The `store_password` function hashes passwords with bcrypt");
        assert_eq!(terms.symbols, vec!["store_password".to_string()]);
        assert_eq!(terms.terms, vec!["hashes", "passwords", "bcrypt"]);
    }

    #[test]
    fn present_terms_pass_with_evidence() {
        let outcome = PatternChecker
            .check(&claim("`store_password` uses bcrypt hash"), &snapshot())
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Pass);
        assert_eq!(outcome.evidence[0].file, "src/auth.rs");
        assert_eq!(outcome.evidence[0].line_number, Some(1));
    }

    #[test]
    fn missing_symbol_is_not_applicable() {
        let outcome = PatternChecker
            .check(&claim("`verify_totp` rejects replayed codes"), &snapshot())
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::NotApplicable);
        assert!(outcome.evidence.is_empty());
    }

    #[test]
    fn absent_terms_fail() {
        let outcome = PatternChecker
            .check(&claim("Uploads are scanned by antivirus quarantine"), &snapshot())
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert!(outcome.reasoning.starts_with("no implementation found"));
    }
}
