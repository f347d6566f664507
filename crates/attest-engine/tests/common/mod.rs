//! Shared stubs for engine integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use attest_core::config::AttestConfig;
use attest_core::errors::VerificationError;
use attest_core::events::*;
use attest_core::models::{Claim, CodebaseSnapshot, Evidence, Verdict};
use attest_core::traits::{CheckOutcome, ClaimChecker};

type CheckFn = dyn Fn(&Claim, &CodebaseSnapshot) -> Result<CheckOutcome, VerificationError>
    + Send
    + Sync;

/// Checker backed by a closure; counts invocations.
pub struct FnChecker {
    check: Box<CheckFn>,
    calls: AtomicUsize,
}

impl FnChecker {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Claim, &CodebaseSnapshot) -> Result<CheckOutcome, VerificationError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            check: Box::new(check),
            calls: AtomicUsize::new(0),
        }
    }

    /// Verdict chosen by the first keyword found in the claim text;
    /// `fallback` otherwise.
    pub fn by_keyword(table: &[(&str, Verdict)], fallback: Verdict) -> Self {
        let table: Vec<(String, Verdict)> = table
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), *v))
            .collect();
        Self::new(move |claim, _| {
            let text = claim.text.to_ascii_lowercase();
            let verdict = table
                .iter()
                .find(|(k, _)| text.contains(k.as_str()))
                .map_or(fallback, |(_, v)| *v);
            Ok(outcome(verdict))
        })
    }

    /// Every claim gets `verdict`.
    pub fn constant(verdict: Verdict) -> Self {
        Self::new(move |_, _| Ok(outcome(verdict)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClaimChecker for FnChecker {
    fn check(
        &self,
        claim: &Claim,
        snapshot: &CodebaseSnapshot,
    ) -> Result<CheckOutcome, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.check)(claim, snapshot)
    }

    fn name(&self) -> &str {
        "fn-stub"
    }
}

/// Contract-satisfying outcome for `verdict`.
pub fn outcome(verdict: Verdict) -> CheckOutcome {
    match verdict {
        Verdict::Pass => CheckOutcome::new(
            verdict,
            vec![Evidence::new("src/lib.rs", Some(1), "fn implemented()", 0.9)],
            "implemented",
        ),
        Verdict::NotApplicable => CheckOutcome::new(verdict, Vec::new(), "not applicable: docs only"),
        _ => CheckOutcome::new(verdict, Vec::new(), "missing implementation"),
    }
}

/// Defaults with millisecond backoff so retry tests stay fast.
pub fn fast_config() -> AttestConfig {
    let mut config = AttestConfig::default();
    config.generate.initial_backoff_ms = 1;
    config.generate.max_backoff_ms = 5;
    config.generate.timeout_ms = 5_000;
    config.verify.concurrency = 2;
    config
}

pub fn snapshot() -> CodebaseSnapshot {
    CodebaseSnapshot::from_sources(
        "/repo",
        [
            ("src/auth.rs", "pub fn login() {}\n"),
            ("src/api.rs", "pub fn list() {}\n"),
        ],
    )
}

pub const FOUR_CLAIMS: &str = "\
## Auth
- [high] [security] Session tokens expire after one hour
- [medium] [correctness] Login rejects empty passwords
## API
- [high] [functionality] List endpoint paginates large results
- [low] [operational] Deployment guide covers rollback steps
";

/// Records event names in emission order.
#[derive(Default)]
pub struct EventLog {
    pub events: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn names(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, name: String) {
        self.events.lock().unwrap().push(name);
    }
}

impl LoopEventHandler for EventLog {
    fn on_iteration_started(&self, e: &IterationStartedEvent) {
        self.push(format!("started:{}", e.iteration));
    }
    fn on_generation_retry(&self, e: &GenerationRetryEvent) {
        self.push(format!("retry:{}:{}", e.iteration, e.attempt));
    }
    fn on_claims_extracted(&self, e: &ClaimsExtractedEvent) {
        self.push(format!("extracted:{}:{}", e.iteration, e.new_claims));
    }
    fn on_claim_verified(&self, e: &ClaimVerifiedEvent) {
        self.push(format!("verified:{}", e.iteration));
    }
    fn on_iteration_scored(&self, e: &IterationScoredEvent) {
        self.push(format!("scored:{}", e.iteration));
    }
    fn on_run_finished(&self, e: &RunFinishedEvent) {
        self.push(format!("finished:{}", e.termination));
    }
}

pub fn dispatcher_with(handler: Arc<dyn LoopEventHandler>) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(handler);
    dispatcher
}
