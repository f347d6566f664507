use serde::{Deserialize, Serialize};

use super::defaults;

/// Verifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Worker pool size for per-claim checks.
    pub concurrency: usize,
    /// Minimum evidence confidence a PASS must carry.
    pub confidence_floor: f64,
    /// Checker runs per claim; >1 enables majority voting.
    pub samples: usize,
    /// Verification cache capacity (entries).
    pub cache_capacity: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            concurrency: defaults::DEFAULT_VERIFY_CONCURRENCY,
            confidence_floor: defaults::DEFAULT_CONFIDENCE_FLOOR,
            samples: defaults::DEFAULT_VERIFY_SAMPLES,
            cache_capacity: defaults::DEFAULT_VERIFY_CACHE_CAPACITY,
        }
    }
}
