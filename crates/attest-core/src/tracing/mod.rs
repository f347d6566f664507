//! Observability for attest.
//! `tracing` crate with `EnvFilter`, per-subsystem log levels.

pub mod metrics;
pub mod setup;
pub mod spans;

pub use setup::init_tracing;
