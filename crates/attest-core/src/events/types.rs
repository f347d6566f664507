//! Event payload types for loop lifecycle events.

/// Payload for `on_iteration_started`.
#[derive(Debug, Clone)]
pub struct IterationStartedEvent {
    pub iteration: u32,
    pub snapshot_fingerprint: u64,
    pub file_count: usize,
}

/// Payload for `on_generation_retry`.
#[derive(Debug, Clone)]
pub struct GenerationRetryEvent {
    pub iteration: u32,
    pub attempt: u32,
    pub backoff_ms: u64,
    pub error: String,
}

/// Payload for `on_claims_extracted`.
#[derive(Debug, Clone)]
pub struct ClaimsExtractedEvent {
    pub iteration: u32,
    pub new_claims: usize,
    pub carried_forward: usize,
    pub dropped_fragments: usize,
    pub live_claims: usize,
}

/// Payload for `on_claim_verified`.
#[derive(Debug, Clone)]
pub struct ClaimVerifiedEvent {
    pub iteration: u32,
    pub claim_id: String,
    pub verdict: String,
    pub checker_error: bool,
}

/// Payload for `on_iteration_scored`.
#[derive(Debug, Clone)]
pub struct IterationScoredEvent {
    pub iteration: u32,
    pub compliance_score: f64,
    pub gap: f64,
    pub unmet: usize,
    pub remediation_items: usize,
}

/// Payload for `on_run_finished`.
#[derive(Debug, Clone)]
pub struct RunFinishedEvent {
    pub iterations: u32,
    pub termination: String,
    pub complete: bool,
    pub duration_ms: u64,
}
