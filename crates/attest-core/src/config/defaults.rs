// Single source of truth for all default values.

// --- Run ---
pub const DEFAULT_WORKING_DIRECTORY: &str = ".";
pub const DEFAULT_FAIL_THRESHOLD: f64 = 80.0;
pub const DEFAULT_DOC_SOURCE: &str = "generated";

// --- Generate ---
pub const DEFAULT_GENERATE_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_GENERATE_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_API_KEY_ENV: &str = "ATTEST_API_KEY";
pub const DEFAULT_MAX_PROMPT_BYTES: usize = 200_000;

// --- Extract ---
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MIN_CLAIM_WORDS: usize = 3;

// --- Verify ---
pub const DEFAULT_VERIFY_CONCURRENCY: usize = 4;
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.5;
pub const DEFAULT_VERIFY_SAMPLES: usize = 1;
pub const DEFAULT_VERIFY_CACHE_CAPACITY: u64 = 10_000;

// --- Score ---
pub const DEFAULT_TOP_ISSUES_LIMIT: usize = 10;

// --- Loop ---
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;
pub const DEFAULT_EPSILON: f64 = 0.05;
pub const DEFAULT_STALL_WINDOW: u32 = 3;

// --- Scan ---
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576; // 1 MB
