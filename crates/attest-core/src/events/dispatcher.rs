//! EventDispatcher: synchronous fan-out to registered handlers.

use std::sync::Arc;

use super::handler::LoopEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn LoopEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn LoopEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Handlers that panic are isolated and do not prevent subsequent
    /// handlers from receiving the event.
    fn emit<F: Fn(&dyn LoopEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing");
            }
        }
    }

    pub fn emit_iteration_started(&self, event: &IterationStartedEvent) {
        self.emit(|h| h.on_iteration_started(event));
    }

    pub fn emit_generation_retry(&self, event: &GenerationRetryEvent) {
        self.emit(|h| h.on_generation_retry(event));
    }

    pub fn emit_claims_extracted(&self, event: &ClaimsExtractedEvent) {
        self.emit(|h| h.on_claims_extracted(event));
    }

    pub fn emit_claim_verified(&self, event: &ClaimVerifiedEvent) {
        self.emit(|h| h.on_claim_verified(event));
    }

    pub fn emit_iteration_scored(&self, event: &IterationScoredEvent) {
        self.emit(|h| h.on_iteration_scored(event));
    }

    pub fn emit_run_finished(&self, event: &RunFinishedEvent) {
        self.emit(|h| h.on_run_finished(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
