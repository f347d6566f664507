//! Run-scoped claim registry.
//!
//! Every claim registered during a run stays live and is re-verified each
//! iteration. Registered claims are never modified; merging only appends.

use rustc_hash::FxHashMap;

use attest_core::models::Claim;

use crate::extract::similarity::{claim_similarity, tokenize, TokenSet};

/// Claims known to the current run, in registration order.
#[derive(Debug, Default, Clone)]
pub struct ClaimRegistry {
    claims: Vec<Claim>,
    tokens: Vec<TokenSet>,
    /// claim id -> position
    by_id: FxHashMap<String, usize>,
    /// content hash of the normalized text -> position
    by_content: FxHashMap<String, usize>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Claim> {
        self.by_id.get(id).map(|&i| &self.claims[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All registered claims, testable or not.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Claims that get verified each iteration.
    pub fn testable(&self) -> Vec<Claim> {
        self.claims.iter().filter(|c| c.testable).cloned().collect()
    }

    /// Find the registered claim `text` restates: exact normalized match
    /// first, then the most similar claim at or above `threshold`.
    /// Ties go to the earliest registered claim.
    pub fn find_match(&self, text: &str, threshold: f64) -> Option<&Claim> {
        if let Some(&i) = self.by_content.get(&Claim::content_id(text)) {
            return Some(&self.claims[i]);
        }
        let query = tokenize(text);
        if query.is_empty() {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in self.tokens.iter().enumerate() {
            let sim = claim_similarity(&query, candidate);
            if sim >= threshold && best.map_or(true, |(_, b)| sim > b) {
                best = Some((i, sim));
            }
        }
        best.map(|(i, _)| &self.claims[i])
    }

    /// Register claims not yet known by id. Returns how many were added.
    pub fn merge(&mut self, claims: impl IntoIterator<Item = Claim>) -> usize {
        let mut added = 0;
        for claim in claims {
            if self.by_id.contains_key(&claim.id) {
                continue;
            }
            let pos = self.claims.len();
            self.by_id.insert(claim.id.clone(), pos);
            self.by_content
                .entry(Claim::content_id(&claim.text))
                .or_insert(pos);
            self.tokens.push(tokenize(&claim.text));
            self.claims.push(claim);
            added += 1;
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::models::{ClaimCategory, Severity};

    fn claim(text: &str) -> Claim {
        Claim::new("api", ClaimCategory::Security, Severity::High, text)
    }

    #[test]
    fn merge_is_idempotent_by_id() {
        let mut reg = ClaimRegistry::new();
        assert_eq!(reg.merge([claim("Tokens expire after one hour")]), 1);
        assert_eq!(reg.merge([claim("tokens expire after one hour.")]), 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn find_match_prefers_exact_then_similar() {
        let mut reg = ClaimRegistry::new();
        let original = claim("Session tokens expire after one hour of inactivity");
        reg.merge([original.clone()]);
        let hit = reg.find_match("session tokens EXPIRE after one hour of inactivity", 0.8);
        assert_eq!(hit.map(|c| c.id.as_str()), Some(original.id.as_str()));
        let hit = reg.find_match("Session tokens expire after one hour of user inactivity", 0.8);
        assert_eq!(hit.map(|c| c.id.as_str()), Some(original.id.as_str()));
        assert!(reg.find_match("Session tokens never expire", 0.8).is_none());
    }

    #[test]
    fn testable_filters_untestable() {
        let mut reg = ClaimRegistry::new();
        reg.merge([claim("Code is pleasant to read").untestable(), claim("Errors are logged with context")]);
        assert_eq!(reg.testable().len(), 1);
        assert_eq!(reg.claims().len(), 2);
    }
}
