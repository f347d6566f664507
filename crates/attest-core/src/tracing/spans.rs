//! Span names for each loop phase, as constants for programmatic use.

pub const RUN: &str = "attest.run";
pub const ITERATION: &str = "attest.iteration";
pub const GENERATE: &str = "attest.generate";
pub const EXTRACT: &str = "attest.extract";
pub const VERIFY: &str = "attest.verify";
pub const SCORE: &str = "attest.score";
pub const REMEDIATE: &str = "attest.remediate";
