//! LoopEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing the claim-verification loop.
///
/// Handlers only override the events they care about. `Send + Sync`
/// because claim-verified events fire from the orchestrator thread while
/// workers are still running.
pub trait LoopEventHandler: Send + Sync {
    fn on_iteration_started(&self, _event: &IterationStartedEvent) {}
    fn on_generation_retry(&self, _event: &GenerationRetryEvent) {}
    fn on_claims_extracted(&self, _event: &ClaimsExtractedEvent) {}
    fn on_claim_verified(&self, _event: &ClaimVerifiedEvent) {}
    fn on_iteration_scored(&self, _event: &IterationScoredEvent) {}
    fn on_run_finished(&self, _event: &RunFinishedEvent) {}
}
