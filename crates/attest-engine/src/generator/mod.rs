//! Supplied [`ClaimGenerator`] implementations.
//!
//! - [`StaticGenerator`]: scripted responses for tests and offline runs
//! - `HttpGenerator` (feature `http`): byok / api-hosted model endpoints

#[cfg(feature = "http")]
pub mod http;
pub mod prompt;

use std::sync::atomic::{AtomicUsize, Ordering};

use attest_core::config::defaults::DEFAULT_MAX_PROMPT_BYTES;
use attest_core::errors::GenerationError;
use attest_core::models::TokenUsage;
use attest_core::traits::{ClaimGenerator, Generation, GenerationRequest};

#[cfg(feature = "http")]
pub use http::HttpGenerator;

/// Returns a fixed script of responses, one per call; the last repeats.
#[derive(Debug)]
pub struct StaticGenerator {
    script: Vec<Result<String, GenerationError>>,
    calls: AtomicUsize,
}

impl StaticGenerator {
    /// Always answer with `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::script(vec![Ok(text.into())])
    }

    /// Answer with each entry in turn. An empty script behaves like an
    /// unavailable generator.
    pub fn script(script: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience for scripts without failures.
    pub fn responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::script(responses.into_iter().map(|s| Ok(s.into())).collect())
    }

    /// Number of `generate` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClaimGenerator for StaticGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(last) = self.script.len().checked_sub(1) else {
            return Err(GenerationError::Unavailable {
                name: self.name().to_string(),
            });
        };
        let text = self.script[n.min(last)].clone()?;
        let input_tokens = prompt::estimate_tokens(&prompt::build_prompt(request, DEFAULT_MAX_PROMPT_BYTES));
        let output_tokens = prompt::estimate_tokens(&text);
        Ok(Generation::new(text).with_usage(TokenUsage::new(input_tokens, output_tokens)))
    }

    fn name(&self) -> &str {
        "static"
    }
}
