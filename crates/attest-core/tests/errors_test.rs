use attest_core::errors::*;

#[test]
fn every_subsystem_has_a_stable_code() {
    let cases: Vec<(LoopError, &str)> = vec![
        (GenerationError::EmptyResponse.into(), "GENERATION_ERROR"),
        (GenerationError::Timeout { timeout_ms: 10 }.into(), "GENERATION_TIMEOUT"),
        (
            ExtractionError::NoClaims {
                input_len: 12,
                dropped: 2,
            }
            .into(),
            "EXTRACTION_ERROR",
        ),
        (
            VerificationError::CheckerFailed {
                checker: "grep".into(),
                claim_id: "c-1".into(),
                reason: "boom".into(),
            }
            .into(),
            "VERIFICATION_ERROR",
        ),
        (
            AggregationError::UnknownClaim {
                claim_id: "c-9".into(),
            }
            .into(),
            "AGGREGATION_ERROR",
        ),
        (
            OrchestrationError::Stalled { window: 3, gap: 0.4 }.into(),
            "STALLED",
        ),
        (
            ConfigError::ValidationFailed {
                field: "loop.epsilon".into(),
                message: "bad".into(),
            }
            .into(),
            "CONFIG_ERROR",
        ),
        (
            SnapshotError::RootNotFound {
                path: "/nope".into(),
            }
            .into(),
            "SNAPSHOT_ERROR",
        ),
    ];
    for (err, code) in cases {
        assert_eq!(err.error_code(), code);
        assert!(
            err.coded_string().starts_with(&format!("[{code}] ")),
            "{}",
            err.coded_string()
        );
    }
}

#[test]
fn only_aggregation_and_config_errors_are_fatal() {
    let fatal: LoopError = AggregationError::CountMismatch {
        pass: 1,
        fail: 0,
        partial: 0,
        na: 0,
        total: 2,
    }
    .into();
    assert!(fatal.is_fatal());

    let recoverable: LoopError = GenerationError::Network {
        reason: "reset".into(),
    }
    .into();
    assert!(!recoverable.is_fatal());

    let per_claim: LoopError = VerificationError::CheckerPanic {
        checker: "c".into(),
        claim_id: "c-1".into(),
        message: "oops".into(),
    }
    .into();
    assert!(!per_claim.is_fatal());
}

#[test]
fn orchestration_errors_carry_their_numbers() {
    let err = OrchestrationError::BudgetExhausted {
        iterations: 3,
        gap: 0.25,
    };
    let msg = err.to_string();
    assert!(msg.contains('3'));
    assert!(msg.contains("0.250"));

    let cancelled = OrchestrationError::Cancelled { iterations: 1 };
    assert_eq!(cancelled.error_code(), "CANCELLED");
}

#[test]
fn snapshot_io_error_keeps_its_source() {
    use std::error::Error as _;
    let err = SnapshotError::Io {
        path: "src/lib.rs".into(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(err.to_string().contains("src/lib.rs"));
    assert!(err.source().is_some());
}
