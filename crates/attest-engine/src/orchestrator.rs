//! Loop orchestrator: drives GENERATE → EXTRACT → VERIFY → SCORE →
//! REMEDIATE until a termination condition holds.
//!
//! Termination, evaluated after each REMEDIATE in priority order:
//! 1. Converged: gap ≤ epsilon, or nothing is FAIL/PARTIAL
//! 2. BudgetExhausted: the iteration count reached `max_iterations`
//! 3. Stalled: the gap failed to strictly decrease `stall_window` times in a row
//!
//! Exhausted GENERATE retries and snapshot failures end the run as Failed.
//! Exhausted EXTRACT retries end it as Failed only when no claim is known
//! yet; otherwise the iteration re-verifies the known claims. Cancellation
//! ends the run as Cancelled. Both keep the artifacts of the
//! last completed iteration with `complete = false`. Only aggregation and
//! configuration errors are returned as `Err`.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};

use attest_core::cancellation::CancellationToken;
use attest_core::config::AttestConfig;
use attest_core::errors::{
    AttestErrorCode, GenerationError, LoopError, OrchestrationError,
};
use attest_core::events::{
    ClaimVerifiedEvent, ClaimsExtractedEvent, EventDispatcher, GenerationRetryEvent,
    IterationScoredEvent, IterationStartedEvent, RunFinishedEvent,
};
use attest_core::models::{
    CodebaseSnapshot, IterationDelta, IterationDiagnostics, IterationRecord, RemediationItem,
    TokenUsage, VerificationSummary,
};
use attest_core::tracing::{metrics, spans};
use attest_core::traits::{
    ClaimChecker, ClaimGenerator, CodebaseSource, Generation, GenerationRequest,
};

use crate::extract::{Extraction, Extractor};
use crate::remediation::RemediationPlanner;
use crate::score::Scorer;
use crate::store::ClaimRegistry;
use crate::verify::Verifier;

/// Granularity of cancellable backoff sleeps.
const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Orchestrator state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Generate,
    Extract,
    Verify,
    Score,
    Remediate,
    Continue,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Generate => "generate",
            Self::Extract => "extract",
            Self::Verify => "verify",
            Self::Score => "score",
            Self::Remediate => "remediate",
            Self::Continue => "continue",
            Self::Done => "done",
        })
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    Converged,
    BudgetExhausted,
    Stalled,
    Failed,
    Cancelled,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Converged => "CONVERGED",
            Self::BudgetExhausted => "BUDGET_EXHAUSTED",
            Self::Stalled => "STALLED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether the run's artifacts are final.
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Converged | Self::BudgetExhausted | Self::Stalled)
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compliance policy verdict, independent of how the run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PolicyOutcome {
    Pass,
    Fail { score: f64, threshold: f64 },
    /// No iteration completed, so there is no score to judge.
    NoResult,
}

/// Resource accounting for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
    /// Generator attempts plus checker invocations.
    pub pipeline_calls: u64,
}

impl RunUsage {
    fn add_tokens(&mut self, usage: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(usage.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(usage.output_tokens);
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub termination: TerminationReason,
    /// False for Failed and Cancelled runs.
    pub complete: bool,
    /// Summary of the last completed iteration.
    pub final_summary: Option<VerificationSummary>,
    pub iterations: Vec<IterationRecord>,
    /// Remediation list of the last completed iteration.
    pub remediation: Vec<RemediationItem>,
    pub usage: RunUsage,
    /// Structured error for BudgetExhausted, Stalled and Cancelled.
    pub termination_error: Option<OrchestrationError>,
    /// Coded error string that ended a Failed run.
    pub failure: Option<String>,
    /// Phase in which a Failed run stopped.
    pub failed_phase: Option<Phase>,
    pub language: Option<String>,
}

impl RunReport {
    /// Judge the final compliance score against `fail_threshold`.
    pub fn policy_outcome(&self, fail_threshold: f64) -> PolicyOutcome {
        match &self.final_summary {
            None => PolicyOutcome::NoResult,
            Some(summary) if summary.compliance_score < fail_threshold => PolicyOutcome::Fail {
                score: summary.compliance_score,
                threshold: fail_threshold,
            },
            Some(_) => PolicyOutcome::Pass,
        }
    }

    pub fn final_gap(&self) -> Option<f64> {
        self.final_summary.as_ref().map(|s| s.specification_gap)
    }

    /// Gap per completed iteration, in order.
    pub fn gap_history(&self) -> Vec<f64> {
        self.iterations.iter().map(|r| r.gap).collect()
    }
}

/// Result of the GENERATE/EXTRACT retry loop.
enum GenerateOutcome {
    Extracted(Extraction),
    Exhausted { error: LoopError, phase: Phase },
    Cancelled,
}

/// Per-run mutable state, owned by `run`.
#[derive(Default)]
struct RunState {
    registry: ClaimRegistry,
    records: Vec<IterationRecord>,
    last_summary: Option<Arc<VerificationSummary>>,
    remediation: Vec<RemediationItem>,
    usage: RunUsage,
    non_improving: u32,
    failure: Option<String>,
    failed_phase: Option<Phase>,
    language: Option<String>,
}

pub struct Orchestrator {
    generator: Arc<dyn ClaimGenerator>,
    source: Arc<dyn CodebaseSource>,
    verifier: Verifier,
    extractor: Extractor,
    scorer: Scorer,
    planner: RemediationPlanner,
    config: AttestConfig,
    events: EventDispatcher,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Validate `config` and wire the loop components.
    pub fn new(
        generator: Arc<dyn ClaimGenerator>,
        checker: Arc<dyn ClaimChecker>,
        source: Arc<dyn CodebaseSource>,
        config: AttestConfig,
    ) -> Result<Self, LoopError> {
        config.validate()?;
        let verifier = Verifier::new(checker, config.verify.clone())?;
        Ok(Self {
            generator,
            source,
            verifier,
            extractor: Extractor::new(config.extract.clone()),
            scorer: Scorer::new(&config.score),
            planner: RemediationPlanner::new(),
            config,
            events: EventDispatcher::new(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Share an invoker-held cancellation token with this run.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AttestConfig {
        &self.config
    }

    /// Run the loop to termination.
    pub fn run(&self) -> Result<RunReport, LoopError> {
        let started = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let run_span = tracing::info_span!(spans::RUN, run_id = %run_id);
        let _run = run_span.enter();

        let mut state = RunState::default();
        let mut phase = Phase::Init;
        let mut iteration: u32 = 0;

        let termination = loop {
            iteration += 1;
            let span = tracing::info_span!(spans::ITERATION, iteration);
            let _iteration = span.enter();

            if self.cancel.is_cancelled() {
                break TerminationReason::Cancelled;
            }

            phase = Phase::Generate;
            let snapshot = match self.source.snapshot() {
                Ok(snapshot) => Arc::new(snapshot),
                Err(e) => {
                    let error = LoopError::from(e);
                    tracing::error!(error = %error, "snapshot failed");
                    state.failure = Some(error.coded_string());
                    state.failed_phase = Some(phase);
                    break TerminationReason::Failed;
                }
            };
            if state.language.is_none() {
                state.language = snapshot.primary_language().map(str::to_string);
            }
            self.events.emit_iteration_started(&IterationStartedEvent {
                iteration,
                snapshot_fingerprint: snapshot.fingerprint(),
                file_count: snapshot.files().len(),
            });

            let mut diagnostics = IterationDiagnostics::default();

            let extraction = match self.generate_and_extract(iteration, &snapshot, &mut state, &mut diagnostics) {
                GenerateOutcome::Extracted(extraction) => Some(extraction),
                GenerateOutcome::Cancelled => break TerminationReason::Cancelled,
                GenerateOutcome::Exhausted { error, phase: failed } => {
                    if failed == Phase::Generate || state.registry.is_empty() {
                        tracing::error!(error = %error, phase = %failed, "generation retries exhausted");
                        state.failure = Some(error.coded_string());
                        state.failed_phase = Some(failed);
                        break TerminationReason::Failed;
                    }
                    tracing::warn!(
                        error = %error,
                        "extraction exhausted; continuing with known claims"
                    );
                    diagnostics.extraction_failed = true;
                    None
                }
            };

            phase = Phase::Extract;
            if let Some(extraction) = extraction {
                diagnostics.carried_forward = extraction.carried_forward;
                diagnostics.dropped_fragments = extraction.dropped;
                diagnostics.duplicate_fragments = extraction.duplicates;
                diagnostics.unknown_tags = extraction.unknown_tags;
                diagnostics.new_claims = state.registry.merge(extraction.claims);
            }
            let live = state.registry.testable();
            self.events.emit_claims_extracted(&ClaimsExtractedEvent {
                iteration,
                new_claims: diagnostics.new_claims,
                carried_forward: diagnostics.carried_forward,
                dropped_fragments: diagnostics.dropped_fragments,
                live_claims: live.len(),
            });

            phase = Phase::Verify;
            let batch = {
                let span = tracing::info_span!(spans::VERIFY, live_claims = live.len());
                let _verify = span.enter();
                self.verifier.verify_all_with(&live, &snapshot, &self.cancel, |v| {
                    self.events.emit_claim_verified(&ClaimVerifiedEvent {
                        iteration,
                        claim_id: v.claim_id.clone(),
                        verdict: v.verdict.to_string(),
                        checker_error: v.is_checker_error(),
                    });
                })
            };
            state.usage.pipeline_calls += batch.checker_calls as u64;
            if batch.cancelled {
                break TerminationReason::Cancelled;
            }
            diagnostics.checker_calls = batch.checker_calls;
            diagnostics.checker_errors = batch.checker_errors;
            tracing::debug!(
                { metrics::LIVE_CLAIMS } = live.len(),
                { metrics::CHECKER_ERRORS } = batch.checker_errors,
                { metrics::CACHE_HITS } = batch.cache_hits,
                carried_forward = batch.carried_forward,
                "verification complete"
            );

            phase = Phase::Score;
            let summary = {
                let _score = tracing::info_span!(spans::SCORE).entered();
                self.scorer.score(state.registry.claims(), batch.verifications)?
            };

            phase = Phase::Remediate;
            let remediation = {
                let _remediate = tracing::info_span!(spans::REMEDIATE).entered();
                self.planner.plan(&summary)
            };

            let reason = self.evaluate(iteration, &summary, &mut state);
            tracing::info!(
                { metrics::COMPLIANCE_SCORE } = summary.compliance_score,
                { metrics::SPECIFICATION_GAP } = summary.specification_gap,
                unmet = summary.unmet_count(),
                terminal = reason.is_some(),
                "iteration scored"
            );
            self.events.emit_iteration_scored(&IterationScoredEvent {
                iteration,
                compliance_score: summary.compliance_score,
                gap: summary.specification_gap,
                unmet: summary.unmet_count(),
                remediation_items: remediation.len(),
            });

            state.records.push(IterationRecord {
                iteration,
                gap: summary.specification_gap,
                timestamp: Utc::now(),
                terminal: reason.is_some(),
                delta: IterationDelta::between(state.last_summary.as_deref(), &summary),
                diagnostics,
                summary: summary.clone(),
            });
            state.last_summary = Some(Arc::new(summary));
            state.remediation = remediation;

            match reason {
                Some(reason) => break reason,
                None => phase = Phase::Continue,
            }
        };
        tracing::debug!(last_phase = %phase, "loop exited");

        Ok(self.finish(run_id, termination, state, started))
    }

    /// GENERATE with timeout and backoff, then EXTRACT. An extraction
    /// failure consumes an attempt from the same budget.
    fn generate_and_extract(
        &self,
        iteration: u32,
        snapshot: &Arc<CodebaseSnapshot>,
        state: &mut RunState,
        diagnostics: &mut IterationDiagnostics,
    ) -> GenerateOutcome {
        let generate = &self.config.generate;
        let request = GenerationRequest {
            iteration,
            snapshot: Arc::clone(snapshot),
            prior_summary: state.last_summary.clone(),
            doc_source: self.config.run.doc_source.clone(),
        };

        let mut last_error = LoopError::from(GenerationError::Unavailable {
            name: self.generator.name().to_string(),
        });
        let mut last_phase = Phase::Generate;

        for attempt in 1..=generate.max_attempts {
            if attempt > 1 {
                let backoff = generate.backoff_for(attempt - 1);
                self.events.emit_generation_retry(&GenerationRetryEvent {
                    iteration,
                    attempt,
                    backoff_ms: backoff.as_millis() as u64,
                    error: last_error.to_string(),
                });
                tracing::warn!(attempt, backoff_ms = backoff.as_millis() as u64, error = %last_error, "retrying generation");
                if !self.sleep_unless_cancelled(backoff) {
                    return GenerateOutcome::Cancelled;
                }
            }
            if self.cancel.is_cancelled() {
                return GenerateOutcome::Cancelled;
            }

            diagnostics.generation_attempts += 1;
            state.usage.pipeline_calls += 1;
            let generation = {
                let _generate = tracing::info_span!(spans::GENERATE, attempt).entered();
                self.call_generator(&request)
            };
            let generation = match generation {
                Ok(generation) => generation,
                Err(e) => {
                    last_error = e.into();
                    last_phase = Phase::Generate;
                    continue;
                }
            };
            state.usage.add_tokens(generation.usage);

            let _extract = tracing::info_span!(spans::EXTRACT).entered();
            match self.extractor.extract(&generation.text, &state.registry) {
                Ok(extraction) => {
                    tracing::debug!({ metrics::GENERATION_ATTEMPTS } = attempt, "claims extracted");
                    return GenerateOutcome::Extracted(extraction);
                }
                Err(e) => {
                    last_error = e.into();
                    last_phase = Phase::Extract;
                }
            }
        }

        GenerateOutcome::Exhausted {
            error: last_error,
            phase: last_phase,
        }
    }

    /// One generator call on a helper thread, bounded by the configured
    /// timeout. A timed-out call is abandoned, not interrupted.
    fn call_generator(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
        let timeout_ms = self.config.generate.timeout_ms;
        let (tx, rx) = crossbeam_channel::bounded(1);
        let generator = Arc::clone(&self.generator);
        let request = request.clone();
        std::thread::Builder::new()
            .name("attest-generate".to_string())
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| generator.generate(&request)))
                    .unwrap_or_else(|_| {
                        Err(GenerationError::Provider {
                            reason: "generator panicked".to_string(),
                        })
                    });
                let _ = tx.send(result);
            })
            .map_err(|e| GenerationError::Unavailable {
                name: format!("{} ({e})", self.generator.name()),
            })?;

        match rx.recv_timeout(self.config.generate.timeout()) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(GenerationError::Timeout { timeout_ms }),
            Err(RecvTimeoutError::Disconnected) => Err(GenerationError::Provider {
                reason: "generator thread exited without a result".to_string(),
            }),
        }
    }

    /// Returns false if cancelled while waiting.
    fn sleep_unless_cancelled(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }

    /// Apply the termination policy to a freshly scored iteration.
    fn evaluate(
        &self,
        iteration: u32,
        summary: &VerificationSummary,
        state: &mut RunState,
    ) -> Option<TerminationReason> {
        let policy = &self.config.loop_policy;
        let gap = summary.specification_gap;
        if let Some(previous) = &state.last_summary {
            if gap < previous.specification_gap {
                state.non_improving = 0;
            } else {
                state.non_improving += 1;
            }
        }

        if gap <= policy.epsilon || summary.unmet_count() == 0 {
            Some(TerminationReason::Converged)
        } else if iteration >= policy.max_iterations {
            Some(TerminationReason::BudgetExhausted)
        } else if state.non_improving >= policy.stall_window {
            Some(TerminationReason::Stalled)
        } else {
            None
        }
    }

    fn finish(
        &self,
        run_id: String,
        termination: TerminationReason,
        state: RunState,
        started: Instant,
    ) -> RunReport {
        let mut usage = state.usage;
        usage.duration_ms = started.elapsed().as_millis() as u64;
        let completed = state.records.len() as u32;
        let gap = state.last_summary.as_ref().map_or(0.0, |s| s.specification_gap);

        let termination_error = match termination {
            TerminationReason::BudgetExhausted => Some(OrchestrationError::BudgetExhausted {
                iterations: completed,
                gap,
            }),
            TerminationReason::Stalled => Some(OrchestrationError::Stalled {
                window: self.config.loop_policy.stall_window,
                gap,
            }),
            TerminationReason::Cancelled => Some(OrchestrationError::Cancelled {
                iterations: completed,
            }),
            TerminationReason::Converged | TerminationReason::Failed => None,
        };

        self.events.emit_run_finished(&RunFinishedEvent {
            iterations: completed,
            termination: termination.to_string(),
            complete: termination.is_complete(),
            duration_ms: usage.duration_ms,
        });
        tracing::info!(
            termination = %termination,
            iterations = completed,
            gap,
            duration_ms = usage.duration_ms,
            "run finished"
        );

        RunReport {
            run_id,
            termination,
            complete: termination.is_complete(),
            final_summary: state.last_summary.map(|s| (*s).clone()),
            iterations: state.records,
            remediation: state.remediation,
            usage,
            termination_error,
            failure: state.failure,
            failed_phase: state.failed_phase,
            language: state.language,
        }
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("generator", &self.generator.name())
            .field("verifier", &self.verifier)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::models::{Claim, ClaimCategory, ClaimVerification, Severity, Verdict};

    fn summary_with(verdicts: &[Verdict]) -> VerificationSummary {
        let claims: Vec<Claim> = verdicts
            .iter()
            .enumerate()
            .map(|(i, _)| {
                Claim::new("s", ClaimCategory::Correctness, Severity::Medium, format!("claim number {i} holds"))
            })
            .collect();
        let verifications = claims
            .iter()
            .zip(verdicts)
            .map(|(c, v)| ClaimVerification::new(&c.id, *v, vec![], "r"))
            .collect();
        Scorer::default().score(&claims, verifications).unwrap()
    }

    fn report(summary: Option<VerificationSummary>) -> RunReport {
        RunReport {
            run_id: "r".to_string(),
            termination: TerminationReason::Converged,
            complete: true,
            final_summary: summary,
            iterations: Vec::new(),
            remediation: Vec::new(),
            usage: RunUsage::default(),
            termination_error: None,
            failure: None,
            failed_phase: None,
            language: None,
        }
    }

    #[test]
    fn policy_outcome_is_independent_of_termination() {
        let failing = report(Some(summary_with(&[Verdict::Fail, Verdict::NotApplicable])));
        assert!(matches!(failing.policy_outcome(80.0), PolicyOutcome::Fail { .. }));
        let passing = report(Some(summary_with(&[Verdict::NotApplicable])));
        assert_eq!(passing.policy_outcome(80.0), PolicyOutcome::Pass);
        assert_eq!(report(None).policy_outcome(80.0), PolicyOutcome::NoResult);
    }

    #[test]
    fn termination_reason_wire_names() {
        let json = serde_json::to_string(&TerminationReason::BudgetExhausted).unwrap();
        assert_eq!(json, "\"BUDGET_EXHAUSTED\"");
        assert!(!TerminationReason::Failed.is_complete());
        assert!(TerminationReason::Stalled.is_complete());
    }
}
