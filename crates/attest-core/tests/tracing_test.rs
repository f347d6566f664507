use attest_core::tracing::{init_tracing, spans};

#[test]
fn init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialised twice without panicking");
}

#[test]
fn span_names_share_the_attest_prefix() {
    for name in [
        spans::RUN,
        spans::ITERATION,
        spans::GENERATE,
        spans::EXTRACT,
        spans::VERIFY,
        spans::SCORE,
        spans::REMEDIATE,
    ] {
        assert!(name.starts_with("attest."), "{name}");
    }
}
