//! Structured field names used in loop spans and events.

/// Iteration index (1-based).
pub const ITERATION: &str = "iteration";

/// Unweighted compliance score (0 - 100).
pub const COMPLIANCE_SCORE: &str = "compliance_score";

/// Severity-weighted specification gap (0.0 - 1.0).
pub const SPECIFICATION_GAP: &str = "specification_gap";

/// Generator attempts within one iteration.
pub const GENERATION_ATTEMPTS: &str = "generation_attempts";

/// Live claims verified in one iteration.
pub const LIVE_CLAIMS: &str = "live_claims";

/// Checker failures absorbed into N/A verdicts.
pub const CHECKER_ERRORS: &str = "checker_errors";

/// Verification cache hit count.
pub const CACHE_HITS: &str = "cache_hits";
