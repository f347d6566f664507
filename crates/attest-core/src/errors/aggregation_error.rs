//! Aggregation errors. These signal a logic defect and abort the run.

use super::error_code::{self, AttestErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("verification references unknown claim {claim_id}")]
    UnknownClaim { claim_id: String },

    #[error("claim {claim_id} verified more than once in a single summary")]
    DuplicateVerification { claim_id: String },

    #[error(
        "count invariant violated: pass {pass} + fail {fail} + partial {partial} + na {na} != total {total}"
    )]
    CountMismatch {
        pass: usize,
        fail: usize,
        partial: usize,
        na: usize,
        total: usize,
    },

    #[error("score out of range: {field} = {value}")]
    ScoreOutOfRange { field: String, value: f64 },
}

impl AttestErrorCode for AggregationError {
    fn error_code(&self) -> &'static str {
        error_code::AGGREGATION_ERROR
    }
}
