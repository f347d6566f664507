//! Token-set Jaccard similarity for paraphrase detection.
//!
//! Negation is tracked separately from the token set: "input is validated"
//! and "input is not validated" share every content token but must never be
//! treated as the same assertion.

use rustc_hash::FxHashSet;

use attest_core::models::claim::normalize_text;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "be", "been", "being", "was", "were", "to", "of", "and", "or",
    "in", "on", "for", "by", "with", "at", "as", "it", "its", "that", "this", "these", "those",
    "all", "any", "each", "every", "must", "should", "shall", "will", "can", "does", "do",
    // contraction stems; the trailing "t" carries the negation
    "doesn", "don", "isn", "aren", "wasn", "weren", "won", "shouldn", "mustn", "couldn",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "without", "cannot", "nor", "none"];

/// Content tokens of a claim plus its negation polarity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub tokens: FxHashSet<String>,
    pub negated: bool,
}

impl TokenSet {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Tokenize claim text: normalize, drop stopwords, record negation.
pub fn tokenize(text: &str) -> TokenSet {
    let normalized = normalize_text(text);
    let mut tokens = FxHashSet::default();
    let mut negations = 0usize;
    for word in normalized.split(' ').filter(|w| !w.is_empty()) {
        // "doesn't" normalizes to "doesn t"
        if NEGATIONS.contains(&word) || word == "t" {
            negations += 1;
            continue;
        }
        if STOPWORDS.contains(&word) {
            continue;
        }
        tokens.insert(word.to_string());
    }
    TokenSet {
        tokens,
        negated: negations % 2 == 1,
    }
}

/// Exact Jaccard similarity between two token sets.
///
/// J(A, B) = |A ∩ B| / |A ∪ B|
/// Returns 0.0 if both sets are empty.
pub fn jaccard_similarity(set_a: &FxHashSet<String>, set_b: &FxHashSet<String>) -> f64 {
    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(set_b).count();
    let union = set_a.union(set_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Similarity between two claims; 0.0 when their negation polarity differs.
pub fn claim_similarity(a: &TokenSet, b: &TokenSet) -> f64 {
    if a.negated != b.negated {
        return 0.0;
    }
    jaccard_similarity(&a.tokens, &b.tokens)
}
