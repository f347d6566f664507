//! Non-convergent terminations. Reported on the run report, never raised.

use serde::{Deserialize, Serialize};

use super::error_code::{self, AttestErrorCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrchestrationError {
    #[error("iteration budget exhausted after {iterations} iterations (gap {gap:.3})")]
    BudgetExhausted { iterations: u32, gap: f64 },

    #[error("gap stalled at {gap:.3} for {window} consecutive iterations")]
    Stalled { window: u32, gap: f64 },

    #[error("run cancelled after {iterations} completed iterations")]
    Cancelled { iterations: u32 },
}

impl AttestErrorCode for OrchestrationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BudgetExhausted { .. } => error_code::BUDGET_EXHAUSTED,
            Self::Stalled { .. } => error_code::STALLED,
            Self::Cancelled { .. } => error_code::CANCELLED,
        }
    }
}
