//! Verifier: runs the per-claim checker under the evidence contract.
//!
//! - Bounded rayon pool (`verify.concurrency`), results streamed back over a
//!   crossbeam channel so the caller can observe completions and cancel.
//! - Verdicts are cached per (claim id, text hash, snapshot fingerprint);
//!   an unchanged claim against an unchanged snapshot always gets the same
//!   verification.
//! - Against a `changed`-mode snapshot, a claim's last verification is
//!   carried forward when nothing changed, or when it passed and none of
//!   its evidence files changed. Everything else is re-checked against the
//!   whole snapshot.
//! - `samples > 1` majority-votes nondeterministic checkers.
//! - A checker `Err` or panic becomes an N/A carrying `checker_error`.
//!   Those results are never cached.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use moka::sync::Cache;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_64;

use attest_core::cancellation::CancellationToken;
use attest_core::config::VerifyConfig;
use attest_core::constants::NOT_APPLICABLE_PREFIX;
use attest_core::errors::{ConfigError, VerificationError};
use attest_core::models::{Claim, ClaimVerification, CodebaseSnapshot, ScanMode, Verdict};
use attest_core::traits::{CheckOutcome, ClaimChecker};

const LOW_CONFIDENCE_REASON: &str = "holds with low-confidence evidence";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    claim_id: String,
    text_hash: u64,
    fingerprint: u64,
}

impl CacheKey {
    fn new(claim: &Claim, snapshot: &CodebaseSnapshot) -> Self {
        Self {
            claim_id: claim.id.clone(),
            text_hash: xxh3_64(claim.text.as_bytes()),
            fingerprint: snapshot.fingerprint(),
        }
    }
}

/// Result of verifying a claim set.
#[derive(Debug, Clone, Default)]
pub struct VerifyBatch {
    /// One verification per input claim, in input order. Empty when
    /// cancelled.
    pub verifications: Vec<ClaimVerification>,
    /// Checker invocations (each sample counts).
    pub checker_calls: usize,
    pub cache_hits: usize,
    /// Verifications reused from the previous changed-mode snapshot.
    pub carried_forward: usize,
    /// N/A verdicts caused by checker failures.
    pub checker_errors: usize,
    pub cancelled: bool,
}

/// Bookkeeping for one claim.
#[derive(Debug, Clone, Copy, Default)]
struct VerifyStats {
    checker_calls: usize,
    cache_hit: bool,
    carried_forward: bool,
}

pub struct Verifier {
    checker: Arc<dyn ClaimChecker>,
    config: VerifyConfig,
    pool: rayon::ThreadPool,
    cache: Cache<CacheKey, ClaimVerification>,
    /// claim id -> (text hash, latest verification)
    latest: Cache<String, (u64, ClaimVerification)>,
}

impl Verifier {
    pub fn new(checker: Arc<dyn ClaimChecker>, config: VerifyConfig) -> Result<Self, ConfigError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency.max(1))
            .thread_name(|i| format!("attest-verify-{i}"))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "verify.concurrency".to_string(),
                message: e.to_string(),
            })?;
        let cache = Cache::builder().max_capacity(config.cache_capacity).build();
        let latest = Cache::builder().max_capacity(config.cache_capacity).build();
        Ok(Self {
            checker,
            config,
            pool,
            cache,
            latest,
        })
    }

    pub fn checker_name(&self) -> &str {
        self.checker.name()
    }

    /// Verify a single claim on the calling thread.
    pub fn verify(&self, claim: &Claim, snapshot: &CodebaseSnapshot) -> ClaimVerification {
        self.verify_one(claim, snapshot).0
    }

    /// Verify every claim on the worker pool.
    pub fn verify_all(
        &self,
        claims: &[Claim],
        snapshot: &CodebaseSnapshot,
        cancel: &CancellationToken,
    ) -> VerifyBatch {
        self.verify_all_with(claims, snapshot, cancel, |_| {})
    }

    /// Like [`verify_all`](Self::verify_all), calling `on_verified` on the
    /// calling thread as each verification completes.
    ///
    /// Cancellation is checked before each queued check starts and between
    /// completions. A cancelled batch returns no verifications.
    pub fn verify_all_with<F>(
        &self,
        claims: &[Claim],
        snapshot: &CodebaseSnapshot,
        cancel: &CancellationToken,
        mut on_verified: F,
    ) -> VerifyBatch
    where
        F: FnMut(&ClaimVerification),
    {
        let mut batch = VerifyBatch::default();
        let mut slots: Vec<Option<ClaimVerification>> = vec![None; claims.len()];
        let (tx, rx) = crossbeam_channel::unbounded::<(usize, Option<(ClaimVerification, VerifyStats)>)>();

        self.pool.in_place_scope(|scope| {
            for (idx, claim) in claims.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let result = if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.verify_one(claim, snapshot))
                    };
                    let _ = tx.send((idx, result));
                });
            }
            drop(tx);

            for (idx, result) in rx.iter() {
                if let Some((verification, stats)) = result {
                    batch.checker_calls += stats.checker_calls;
                    if stats.cache_hit {
                        batch.cache_hits += 1;
                    }
                    if stats.carried_forward {
                        batch.carried_forward += 1;
                    }
                    if verification.is_checker_error() {
                        batch.checker_errors += 1;
                    }
                    if !batch.cancelled {
                        on_verified(&verification);
                    }
                    slots[idx] = Some(verification);
                }
                if cancel.is_cancelled() {
                    batch.cancelled = true;
                }
            }
        });

        if batch.cancelled || slots.iter().any(Option::is_none) {
            batch.cancelled = true;
            return batch;
        }
        batch.verifications = slots.into_iter().flatten().collect();
        batch
    }

    fn verify_one(&self, claim: &Claim, snapshot: &CodebaseSnapshot) -> (ClaimVerification, VerifyStats) {
        let key = CacheKey::new(claim, snapshot);
        if let Some(cached) = self.cache.get(&key) {
            self.latest.insert(claim.id.clone(), (key.text_hash, cached.clone()));
            return (
                cached,
                VerifyStats {
                    cache_hit: true,
                    ..Default::default()
                },
            );
        }
        if snapshot.scan_mode() == ScanMode::Changed {
            if let Some(previous) = self.carry_forward(claim, key.text_hash, snapshot) {
                return (
                    previous,
                    VerifyStats {
                        carried_forward: true,
                        ..Default::default()
                    },
                );
            }
        }

        let samples = self.config.samples.max(1);
        let mut results = Vec::with_capacity(samples);
        for _ in 0..samples {
            results.push(self.run_checker(claim, snapshot));
        }
        let verification = majority(results).unwrap_or_else(|| {
            let error = VerificationError::CheckerFailed {
                checker: self.checker.name().to_string(),
                claim_id: claim.id.clone(),
                reason: "no checker samples".to_string(),
            };
            ClaimVerification::checker_failure(&claim.id, &error)
        });
        if !verification.is_checker_error() {
            self.latest.insert(claim.id.clone(), (key.text_hash, verification.clone()));
            self.cache.insert(key, verification.clone());
        } else {
            tracing::warn!(
                claim_id = %claim.id,
                checker = self.checker.name(),
                reason = verification.checker_error.as_deref().unwrap_or_default(),
                "checker failed; recorded as N/A"
            );
        }
        (
            verification,
            VerifyStats {
                checker_calls: samples,
                ..Default::default()
            },
        )
    }

    /// The claim's latest verification, if the changed set cannot affect it.
    fn carry_forward(
        &self,
        claim: &Claim,
        text_hash: u64,
        snapshot: &CodebaseSnapshot,
    ) -> Option<ClaimVerification> {
        let (previous_hash, previous) = self.latest.get(&claim.id)?;
        if previous_hash != text_hash {
            return None;
        }
        let untouched = !snapshot.has_changes()
            || (previous.verdict == Verdict::Pass
                && !previous
                    .evidence
                    .iter()
                    .any(|e| snapshot.is_changed(Path::new(&e.file))));
        untouched.then_some(previous)
    }

    /// One isolated checker invocation, normalized to the evidence contract.
    fn run_checker(&self, claim: &Claim, snapshot: &CodebaseSnapshot) -> ClaimVerification {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.checker.check(claim, snapshot)));
        match outcome {
            Ok(Ok(outcome)) => normalize(&claim.id, outcome, self.config.confidence_floor),
            Ok(Err(error)) => ClaimVerification::checker_failure(&claim.id, &error),
            Err(payload) => {
                let error = VerificationError::CheckerPanic {
                    checker: self.checker.name().to_string(),
                    claim_id: claim.id.clone(),
                    message: panic_message(payload.as_ref()),
                };
                ClaimVerification::checker_failure(&claim.id, &error)
            }
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("checker", &self.checker.name())
            .field("config", &self.config)
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

/// Enforce the verdict/evidence contract on a raw checker outcome.
///
/// - PASS without evidence at or above `floor` becomes PARTIAL.
/// - N/A reasoning always carries the `not applicable:` prefix.
pub fn normalize(claim_id: &str, outcome: CheckOutcome, floor: f64) -> ClaimVerification {
    let CheckOutcome {
        verdict,
        evidence,
        reasoning,
    } = outcome;
    let reasoning = reasoning.trim().to_string();
    let mut verification = ClaimVerification::new(claim_id, verdict, evidence, reasoning);
    match verdict {
        Verdict::Pass if !verification.satisfies_contract(floor) => {
            verification.verdict = Verdict::Partial;
            verification.reasoning = if verification.reasoning.is_empty() {
                LOW_CONFIDENCE_REASON.to_string()
            } else {
                format!("{LOW_CONFIDENCE_REASON}: {}", verification.reasoning)
            };
        }
        Verdict::NotApplicable if !verification.reasoning.starts_with(NOT_APPLICABLE_PREFIX) => {
            verification.reasoning = if verification.reasoning.is_empty() {
                NOT_APPLICABLE_PREFIX.to_string()
            } else {
                format!("{NOT_APPLICABLE_PREFIX} {}", verification.reasoning)
            };
        }
        _ => {}
    }
    verification
}

/// Majority verdict across samples; ties go to the more conservative
/// verdict. Failed samples do not vote unless every sample failed.
fn majority(samples: Vec<ClaimVerification>) -> Option<ClaimVerification> {
    let mut counts: FxHashMap<Verdict, usize> = FxHashMap::default();
    for sample in samples.iter().filter(|s| !s.is_checker_error()) {
        *counts.entry(sample.verdict).or_insert(0) += 1;
    }
    let winner = counts
        .into_iter()
        .max_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| a.0.strictness().cmp(&b.0.strictness()))
        })
        .map(|(verdict, _)| verdict);

    match winner {
        Some(verdict) => samples
            .into_iter()
            .find(|s| !s.is_checker_error() && s.verdict == verdict),
        None => samples.into_iter().next(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rustc_hash::FxHashSet;

    use attest_core::constants::VERIFICATION_ERROR_PREFIX;
    use attest_core::models::{ClaimCategory, Evidence, Severity};

    struct Scripted {
        verdicts: Vec<Verdict>,
        calls: AtomicUsize,
    }

    impl ClaimChecker for Scripted {
        fn check(
            &self,
            _claim: &Claim,
            _snapshot: &CodebaseSnapshot,
        ) -> Result<CheckOutcome, VerificationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let verdict = self.verdicts[n % self.verdicts.len()];
            let evidence = vec![Evidence::new("src/lib.rs", Some(n as u32 + 1), "fn x()", 0.9)];
            Ok(CheckOutcome::new(verdict, evidence, format!("sample {n}")))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Panicky;

    impl ClaimChecker for Panicky {
        fn check(
            &self,
            claim: &Claim,
            _snapshot: &CodebaseSnapshot,
        ) -> Result<CheckOutcome, VerificationError> {
            if claim.text.contains("explode") {
                panic!("checker blew up");
            }
            Ok(CheckOutcome::new(
                Verdict::Pass,
                vec![Evidence::new("a.rs", None, "ok", 1.0)],
                "fine",
            ))
        }

        fn name(&self) -> &str {
            "panicky"
        }
    }

    fn claim(text: &str) -> Claim {
        Claim::new("s", ClaimCategory::Correctness, Severity::Medium, text)
    }

    fn snapshot() -> CodebaseSnapshot {
        CodebaseSnapshot::from_sources("/r", [("src/lib.rs", "fn x() {}")])
    }

    #[test]
    fn low_confidence_pass_becomes_partial() {
        let outcome = CheckOutcome::new(
            Verdict::Pass,
            vec![Evidence::new("a.rs", None, "", 0.2)],
            "weak match",
        );
        let v = normalize("c-1", outcome, 0.5);
        assert_eq!(v.verdict, Verdict::Partial);
        assert!(v.reasoning.starts_with(LOW_CONFIDENCE_REASON));
    }

    #[test]
    fn not_applicable_gets_prefix() {
        let outcome = CheckOutcome::new(
            Verdict::NotApplicable,
            vec![Evidence::new("a.rs", None, "", 0.9)],
            "only applies to web targets",
        );
        let v = normalize("c-1", outcome, 0.5);
        assert_eq!(v.reasoning, "not applicable: only applies to web targets");
        assert!(v.satisfies_contract(0.5));
    }

    #[test]
    fn majority_tie_prefers_conservative() {
        let checker = Arc::new(Scripted {
            verdicts: vec![Verdict::Pass, Verdict::Fail],
            calls: AtomicUsize::new(0),
        });
        let config = VerifyConfig {
            samples: 2,
            ..Default::default()
        };
        let verifier = Verifier::new(checker, config).unwrap();
        let v = verifier.verify(&claim("Widgets are frobnicated"), &snapshot());
        assert_eq!(v.verdict, Verdict::Fail);
        assert_eq!(v.reasoning, "sample 1");
    }

    #[test]
    fn cached_verdict_is_reused() {
        let checker = Arc::new(Scripted {
            verdicts: vec![Verdict::Pass, Verdict::Fail],
            calls: AtomicUsize::new(0),
        });
        let verifier = Verifier::new(checker.clone(), VerifyConfig::default()).unwrap();
        let c = claim("Widgets are frobnicated");
        let first = verifier.verify(&c, &snapshot());
        let second = verifier.verify(&c, &snapshot());
        assert_eq!(first, second);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    fn changed(paths: &[&str]) -> FxHashSet<PathBuf> {
        paths.iter().map(|p| PathBuf::from(*p)).collect()
    }

    fn tree(lib: &str, readme: &str) -> CodebaseSnapshot {
        CodebaseSnapshot::from_sources("/r", [("src/lib.rs", lib), ("README.md", readme)])
    }

    #[test]
    fn changed_mode_rechecks_only_touched_passes() {
        let checker = Arc::new(Scripted {
            verdicts: vec![Verdict::Pass, Verdict::Fail],
            calls: AtomicUsize::new(0),
        });
        let verifier = Verifier::new(checker.clone(), VerifyConfig::default()).unwrap();
        let c = claim("Widgets are frobnicated");

        let first = tree("fn x() {}", "v1").with_changed(changed(&["src/lib.rs", "README.md"]));
        assert_eq!(verifier.verify(&c, &first).verdict, Verdict::Pass);

        // evidence lives in src/lib.rs; a docs edit leaves the pass standing
        let docs_edit = tree("fn x() {}", "v2").with_changed(changed(&["README.md"]));
        let batch = verifier.verify_all(&[c.clone()], &docs_edit, &CancellationToken::new());
        assert_eq!(batch.carried_forward, 1);
        assert_eq!(batch.checker_calls, 0);
        assert_eq!(batch.verifications[0].verdict, Verdict::Pass);

        let code_edit = tree("fn y() {}", "v2").with_changed(changed(&["src/lib.rs"]));
        assert_eq!(verifier.verify(&c, &code_edit).verdict, Verdict::Fail);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn changed_mode_rechecks_unmet_claims_on_any_change() {
        let checker = Arc::new(Scripted {
            verdicts: vec![Verdict::Fail, Verdict::Pass],
            calls: AtomicUsize::new(0),
        });
        let verifier = Verifier::new(checker.clone(), VerifyConfig::default()).unwrap();
        let c = claim("Widgets are frobnicated");

        assert_eq!(verifier.verify(&c, &snapshot()).verdict, Verdict::Fail);
        let quiet = snapshot().with_changed(FxHashSet::default());
        assert_eq!(verifier.verify(&c, &quiet).verdict, Verdict::Fail);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);

        let elsewhere = CodebaseSnapshot::from_sources(
            "/r",
            [("src/lib.rs", "fn x() {}"), ("src/other.rs", "fn fix() {}")],
        )
        .with_changed(changed(&["src/other.rs"]));
        assert_eq!(verifier.verify(&c, &elsewhere).verdict, Verdict::Pass);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panic_is_isolated_to_one_claim() {
        let verifier = Verifier::new(Arc::new(Panicky), VerifyConfig::default()).unwrap();
        let claims = vec![claim("This will explode loudly"), claim("This one is fine")];
        let batch = verifier.verify_all(&claims, &snapshot(), &CancellationToken::new());
        assert!(!batch.cancelled);
        assert_eq!(batch.verifications.len(), 2);
        assert_eq!(batch.checker_errors, 1);
        let failed = &batch.verifications[0];
        assert_eq!(failed.verdict, Verdict::NotApplicable);
        assert!(failed.reasoning.starts_with(VERIFICATION_ERROR_PREFIX));
        assert!(failed.evidence.is_empty());
        assert_eq!(batch.verifications[1].verdict, Verdict::Pass);
    }

    #[test]
    fn cancelled_batch_returns_nothing() {
        let verifier = Verifier::new(Arc::new(Panicky), VerifyConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let claims = vec![claim("This one is fine")];
        let batch = verifier.verify_all(&claims, &snapshot(), &cancel);
        assert!(batch.cancelled);
        assert!(batch.verifications.is_empty());
        assert_eq!(batch.checker_calls, 0);
    }
}
