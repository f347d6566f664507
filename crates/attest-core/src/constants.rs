/// attest version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reasoning prefix for N/A verdicts produced by a checker failure.
pub const VERIFICATION_ERROR_PREFIX: &str = "verification error:";

/// Reasoning prefix marking a genuine "not applicable" verdict.
pub const NOT_APPLICABLE_PREFIX: &str = "not applicable:";

/// Prefix for content-hash claim identifiers.
pub const CLAIM_ID_PREFIX: &str = "c-";

/// Number of hex characters kept from the claim content hash.
pub const CLAIM_ID_HEX_LEN: usize = 16;

/// Project config file name, resolved against the working directory.
pub const PROJECT_CONFIG_FILE: &str = "attest.toml";

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "ATTEST_";
