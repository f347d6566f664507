use std::sync::Arc;

use crate::errors::GenerationError;
use crate::models::{CodebaseSnapshot, TokenUsage, VerificationSummary};

/// Input to one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// 1-based iteration index.
    pub iteration: u32,
    pub snapshot: Arc<CodebaseSnapshot>,
    /// Summary of the previous iteration, absent on the first.
    pub prior_summary: Option<Arc<VerificationSummary>>,
    /// Provenance string for where claims originate.
    pub doc_source: String,
}

/// Raw generator output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// External text-generation capability producing candidate claims.
///
/// Treated as unreliable: may be slow, fail, or return malformed text.
/// Implementations must not mutate shared state.
pub trait ClaimGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError>;

    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;
}
