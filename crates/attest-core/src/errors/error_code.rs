//! AttestErrorCode trait for automation consumers.

/// Structured error code for every attest error enum.
///
/// CI collaborators match on the code rather than on the message text.
pub trait AttestErrorCode {
    /// Returns the error code string (e.g., "GENERATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const GENERATION_ERROR: &str = "GENERATION_ERROR";
pub const GENERATION_TIMEOUT: &str = "GENERATION_TIMEOUT";
pub const EXTRACTION_ERROR: &str = "EXTRACTION_ERROR";
pub const VERIFICATION_ERROR: &str = "VERIFICATION_ERROR";
pub const AGGREGATION_ERROR: &str = "AGGREGATION_ERROR";
pub const BUDGET_EXHAUSTED: &str = "BUDGET_EXHAUSTED";
pub const STALLED: &str = "STALLED";
pub const CANCELLED: &str = "CANCELLED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SNAPSHOT_ERROR: &str = "SNAPSHOT_ERROR";
