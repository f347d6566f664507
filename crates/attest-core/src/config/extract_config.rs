use serde::{Deserialize, Serialize};

use super::defaults;

/// Extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Token-set Jaccard similarity at which two claims are the same assertion.
    pub similarity_threshold: f64,
    /// Fragments with fewer words are dropped as malformed.
    pub min_words: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            min_words: defaults::DEFAULT_MIN_CLAIM_WORDS,
        }
    }
}
