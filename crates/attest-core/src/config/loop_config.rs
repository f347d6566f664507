use serde::{Deserialize, Serialize};

use super::defaults;

/// Convergence and termination policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub max_iterations: u32,
    /// Gap tolerance at or below which the run has converged.
    pub epsilon: f64,
    /// Consecutive non-improving iterations before the run is stalled.
    pub stall_window: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: defaults::DEFAULT_MAX_ITERATIONS,
            epsilon: defaults::DEFAULT_EPSILON,
            stall_window: defaults::DEFAULT_STALL_WINDOW,
        }
    }
}
