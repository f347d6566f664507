//! HTTP claim generator.
//!
//! Two routing modes:
//! - `byok`: OpenAI-compatible chat-completions endpoint, caller's key
//! - `api-hosted`: hosted generation endpoint, service token
//!
//! One request per `generate` call; retry and timeout policy belong to the
//! orchestrator.

use serde::{Deserialize, Serialize};

use attest_core::config::{GenerateConfig, GenerationMode, RunConfig};
use attest_core::errors::{ConfigError, GenerationError};
use attest_core::models::TokenUsage;
use attest_core::traits::{ClaimGenerator, Generation, GenerationRequest};

use super::prompt;

const DEFAULT_BYOK_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_BYOK_MODEL: &str = "gpt-4o-mini";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Serialize)]
struct HostedRequest<'a> {
    prompt: &'a str,
    iteration: u32,
    doc_source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

#[derive(Deserialize)]
struct HostedResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

/// Blocking HTTP generator for both routing modes.
pub struct HttpGenerator {
    client: reqwest::blocking::Client,
    mode: GenerationMode,
    endpoint: String,
    model: String,
    token: String,
    timeout_ms: u64,
    max_prompt_bytes: usize,
}

impl HttpGenerator {
    /// Build from config. The credential is read from the environment
    /// variable named by `generate.api_key_env`.
    pub fn from_config(run: &RunConfig, generate: &GenerateConfig) -> Result<Self, ConfigError> {
        let token = std::env::var(&generate.api_key_env).map_err(|_| ConfigError::InvalidValue {
            field: "generate.api_key_env".to_string(),
            message: format!("environment variable {} is not set", generate.api_key_env),
        })?;
        Self::new(run.mode, generate, token)
    }

    pub fn new(
        mode: GenerationMode,
        generate: &GenerateConfig,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let endpoint = match (mode, &generate.endpoint) {
            (_, Some(endpoint)) => endpoint.clone(),
            (GenerationMode::Byok, None) => DEFAULT_BYOK_ENDPOINT.to_string(),
            (GenerationMode::ApiHosted, None) => {
                return Err(ConfigError::ValidationFailed {
                    field: "generate.endpoint".to_string(),
                    message: "required in api-hosted mode".to_string(),
                })
            }
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(generate.timeout())
            .gzip(true)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "generate".to_string(),
                message: format!("HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            mode,
            endpoint,
            model: generate
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_BYOK_MODEL.to_string()),
            token: token.into(),
            timeout_ms: generate.timeout_ms,
            max_prompt_bytes: generate.max_prompt_bytes,
        })
    }

    fn send<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        body: &B,
    ) -> Result<R, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Provider {
                reason: format!("{status}: {}", body.chars().take(500).collect::<String>()),
            });
        }
        response.json().map_err(|e| GenerationError::Provider {
            reason: format!("malformed response: {e}"),
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GenerationError::Network {
                reason: error.to_string(),
            }
        }
    }
}

impl ClaimGenerator for HttpGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerationError> {
        let prompt_text = prompt::build_prompt(request, self.max_prompt_bytes);
        tracing::debug!(
            mode = %self.mode,
            endpoint = %self.endpoint,
            prompt_bytes = prompt_text.len(),
            "sending generation request"
        );

        let (text, usage) = match self.mode {
            GenerationMode::Byok => {
                let body = ChatRequest {
                    model: &self.model,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: &prompt_text,
                    }],
                    temperature: 0.0,
                };
                let response: ChatResponse = self.send(&body)?;
                let text = response
                    .choices
                    .into_iter()
                    .find_map(|c| c.message.content)
                    .unwrap_or_default();
                let usage = response
                    .usage
                    .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
                (text, usage)
            }
            GenerationMode::ApiHosted => {
                let body = HostedRequest {
                    prompt: &prompt_text,
                    iteration: request.iteration,
                    doc_source: &request.doc_source,
                    language: request.snapshot.primary_language(),
                };
                let response: HostedResponse = self.send(&body)?;
                (response.text, response.usage)
            }
        };

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        let usage = usage.unwrap_or_else(|| {
            TokenUsage::new(prompt::estimate_tokens(&prompt_text), prompt::estimate_tokens(&text))
        });
        Ok(Generation::new(text).with_usage(usage))
    }

    fn name(&self) -> &str {
        match self.mode {
            GenerationMode::Byok => "http-byok",
            GenerationMode::ApiHosted => "http-api-hosted",
        }
    }
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_mode_requires_endpoint() {
        let err = HttpGenerator::new(GenerationMode::ApiHosted, &GenerateConfig::default(), "t")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn byok_defaults_endpoint_and_model() {
        let generator =
            HttpGenerator::new(GenerationMode::Byok, &GenerateConfig::default(), "k").unwrap();
        assert_eq!(generator.endpoint, DEFAULT_BYOK_ENDPOINT);
        assert_eq!(generator.model, DEFAULT_BYOK_MODEL);
        assert_eq!(generator.name(), "http-byok");
    }
}
