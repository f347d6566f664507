use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Generator call timeout and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    /// Total attempts per iteration, including the first.
    pub max_attempts: u32,
    /// Initial backoff (doubles each retry).
    pub initial_backoff_ms: u64,
    /// Backoff ceiling.
    pub max_backoff_ms: u64,
    /// Endpoint override for the HTTP generator.
    pub endpoint: Option<String>,
    /// Model name passed to the provider in byok mode.
    pub model: Option<String>,
    /// Environment variable holding the provider key or service token.
    pub api_key_env: String,
    /// Source bytes included in a prompt before truncation.
    pub max_prompt_bytes: usize,
}

impl GenerateConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Backoff before retry number `retry` (1-based), capped.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        let ms = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(ms.min(self.max_backoff_ms))
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::DEFAULT_GENERATE_TIMEOUT_MS,
            max_attempts: defaults::DEFAULT_GENERATE_MAX_ATTEMPTS,
            initial_backoff_ms: defaults::DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_MAX_BACKOFF_MS,
            endpoint: None,
            model: None,
            api_key_env: defaults::DEFAULT_API_KEY_ENV.to_string(),
            max_prompt_bytes: defaults::DEFAULT_MAX_PROMPT_BYTES,
        }
    }
}
