//! Extractor: raw generator text to deduplicated, stably identified claims.
//!
//! Two input formats are accepted:
//! - JSON: an array of claim objects, or an object with a `claims` array
//!   (optionally inside a fenced code block)
//! - Line-oriented: `## Section` headings followed by bullet or numbered
//!   lines, each with optional `[severity]`, `[category]`, `[untestable]` tags
//!
//! Identity is resolved against the run's [`ClaimRegistry`]: a fragment that
//! restates a known claim inherits its id, everything else gets a fresh
//! content hash.

pub mod json;
pub mod lines;
pub mod similarity;

use attest_core::config::ExtractConfig;
use attest_core::errors::ExtractionError;
use attest_core::models::{Claim, ClaimCategory, Severity};

use crate::store::ClaimRegistry;
use similarity::{claim_similarity, tokenize, TokenSet};

/// One parsed candidate before validation and identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub section: String,
    pub text: String,
    pub category: ClaimCategory,
    pub severity: Severity,
    pub testable: bool,
}

impl Fragment {
    pub fn new(section: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            text: text.into(),
            category: ClaimCategory::default(),
            severity: Severity::default(),
            testable: true,
        }
    }
}

/// Output of one parser pass.
#[derive(Debug, Default)]
pub struct ParsedFragments {
    pub fragments: Vec<Fragment>,
    /// Items the parser could not interpret at all.
    pub dropped: usize,
    /// Tags or fields with unrecognized severity/category values.
    pub unknown_tags: usize,
}

/// Claims extracted from one generator response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Deduplicated claims in input order, ids resolved.
    pub claims: Vec<Claim>,
    /// Claims not previously registered.
    pub new_claims: usize,
    /// Claims matched to a registered claim.
    pub carried_forward: usize,
    /// Fragments collapsed into an earlier fragment of the same batch.
    pub duplicates: usize,
    /// Malformed fragments.
    pub dropped: usize,
    pub unknown_tags: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Parse `raw` and resolve claim identities against `registry`.
    ///
    /// Whitespace-only input yields an empty extraction. Non-empty input
    /// that produces no claim is an [`ExtractionError::NoClaims`].
    pub fn extract(
        &self,
        raw: &str,
        registry: &ClaimRegistry,
    ) -> Result<Extraction, ExtractionError> {
        if raw.trim().is_empty() {
            return Ok(Extraction::default());
        }

        let parsed = match json::parse(raw) {
            Some(parsed) => parsed,
            None => lines::parse(raw),
        };

        let mut out = Extraction {
            dropped: parsed.dropped,
            unknown_tags: parsed.unknown_tags,
            ..Default::default()
        };
        let mut batch_tokens: Vec<TokenSet> = Vec::new();

        for fragment in parsed.fragments {
            let text = clean_text(&fragment.text);
            if !self.is_well_formed(&text) {
                out.dropped += 1;
                continue;
            }

            let claim = match registry.find_match(&text, self.config.similarity_threshold) {
                Some(known) => known.clone(),
                None => Claim {
                    id: Claim::content_id(&text),
                    section: fragment.section,
                    category: fragment.category,
                    severity: fragment.severity,
                    text,
                    testable: fragment.testable,
                },
            };

            let tokens = tokenize(&claim.text);
            let duplicate = out.claims.iter().zip(&batch_tokens).any(|(seen, seen_tokens)| {
                seen.id == claim.id
                    || claim_similarity(&tokens, seen_tokens) >= self.config.similarity_threshold
            });
            if duplicate {
                out.duplicates += 1;
                continue;
            }

            if registry.contains(&claim.id) {
                out.carried_forward += 1;
            } else {
                out.new_claims += 1;
            }
            batch_tokens.push(tokens);
            out.claims.push(claim);
        }

        if out.claims.is_empty() {
            return Err(ExtractionError::NoClaims {
                input_len: raw.len(),
                dropped: out.dropped,
            });
        }

        tracing::debug!(
            new = out.new_claims,
            carried_forward = out.carried_forward,
            duplicates = out.duplicates,
            dropped = out.dropped,
            "claims extracted"
        );
        Ok(out)
    }

    fn is_well_formed(&self, text: &str) -> bool {
        text.split_whitespace().count() >= self.config.min_words
            && text.chars().any(char::is_alphabetic)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

/// Strip markdown emphasis and collapse whitespace.
fn clean_text(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_input_is_empty_not_error() {
        let extraction = Extractor::default()
            .extract("  \n\t ", &ClaimRegistry::new())
            .unwrap();
        assert!(extraction.is_empty());
    }

    #[test]
    fn garbage_input_is_no_claims() {
        let err = Extractor::default()
            .extract("- ok\n- 123 456 789\n", &ClaimRegistry::new())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::NoClaims { dropped: 2, .. }));
    }

    #[test]
    fn batch_paraphrases_collapse() {
        let raw = "- Passwords are hashed with bcrypt before storage\n\
                   - All passwords are hashed with bcrypt before storage.\n\
                   - Login attempts are rate limited per account\n";
        let extraction = Extractor::default().extract(raw, &ClaimRegistry::new()).unwrap();
        assert_eq!(extraction.claims.len(), 2);
        assert_eq!(extraction.duplicates, 1);
        assert_eq!(extraction.new_claims, 2);
    }

    #[test]
    fn known_claims_keep_their_id() {
        let mut registry = ClaimRegistry::new();
        let known = Claim::new(
            "auth",
            ClaimCategory::Security,
            Severity::Critical,
            "Session tokens expire after one hour of inactivity",
        );
        registry.merge([known.clone()]);

        let raw = "- [low] Session tokens expire after one hour of user inactivity\n";
        let extraction = Extractor::default().extract(raw, &registry).unwrap();
        assert_eq!(extraction.carried_forward, 1);
        assert_eq!(extraction.claims[0], known);
        assert_eq!(extraction.new_claims, 0);
    }
}
