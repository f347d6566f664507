use serde::{Deserialize, Serialize};

use super::defaults;

/// Aggregator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Cap on `top_issues` in a summary.
    pub top_issues_limit: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            top_issues_limit: defaults::DEFAULT_TOP_ISSUES_LIMIT,
        }
    }
}
