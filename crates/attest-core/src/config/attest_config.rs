//! Top-level attest configuration with layered resolution.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    ExtractConfig, GenerateConfig, GenerationMode, LoopConfig, RunConfig, ScoreConfig,
    VerifyConfig,
};
use crate::constants::{ENV_PREFIX, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;
use crate::models::ScanMode;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`ATTEST_*`)
/// 3. Project config (`attest.toml` in the working directory)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AttestConfig {
    pub run: RunConfig,
    pub generate: GenerateConfig,
    pub extract: ExtractConfig,
    pub verify: VerifyConfig,
    pub score: ScoreConfig,
    #[serde(rename = "loop")]
    pub loop_policy: LoopConfig,
}

/// Invoker overrides that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub working_directory: Option<PathBuf>,
    pub scan_mode: Option<ScanMode>,
    pub fail_threshold: Option<f64>,
    pub doc_source: Option<String>,
    pub mode: Option<GenerationMode>,
    pub max_iterations: Option<u32>,
    pub concurrency: Option<usize>,
}

impl AttestConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        let mut config = if project_config_path.exists() {
            Self::from_file(&project_config_path)?
        } else {
            Self::default()
        };
        if config.run.working_directory == Path::new(super::defaults::DEFAULT_WORKING_DIRECTORY) {
            config.run.working_directory = root.to_path_buf();
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `ATTEST_*` variables resolved through `lookup`.
    ///
    /// Taking the lookup as a closure keeps tests free of process-wide
    /// environment mutation.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(dir) = var("WORKING_DIRECTORY") {
            self.run.working_directory = PathBuf::from(dir);
        }
        if let Some(v) = var("SCAN_MODE") {
            self.run.scan_mode = match v.trim().to_ascii_lowercase().as_str() {
                "full" => ScanMode::Full,
                "changed" => ScanMode::Changed,
                other => return Err(invalid("SCAN_MODE", format!("unknown scan mode: {other}"))),
            };
        }
        if let Some(v) = var("FAIL_THRESHOLD") {
            self.run.fail_threshold = parse_env("FAIL_THRESHOLD", &v)?;
        }
        if let Some(v) = var("DOC_SOURCE") {
            self.run.doc_source = v;
        }
        if let Some(v) = var("MODE") {
            self.run.mode = GenerationMode::from_str(&v).map_err(|e| invalid("MODE", e))?;
        }
        if let Some(v) = var("MAX_ITERATIONS") {
            self.loop_policy.max_iterations = parse_env("MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = var("EPSILON") {
            self.loop_policy.epsilon = parse_env("EPSILON", &v)?;
        }
        if let Some(v) = var("CONCURRENCY") {
            self.verify.concurrency = parse_env("CONCURRENCY", &v)?;
        }
        if let Some(v) = var("TIMEOUT_MS") {
            self.generate.timeout_ms = parse_env("TIMEOUT_MS", &v)?;
        }
        Ok(())
    }

    /// Apply explicit overrides (highest priority).
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref dir) = overrides.working_directory {
            self.run.working_directory = dir.clone();
        }
        if let Some(mode) = overrides.scan_mode {
            self.run.scan_mode = mode;
        }
        if let Some(threshold) = overrides.fail_threshold {
            self.run.fail_threshold = threshold;
        }
        if let Some(ref source) = overrides.doc_source {
            self.run.doc_source = source.clone();
        }
        if let Some(mode) = overrides.mode {
            self.run.mode = mode;
        }
        if let Some(max) = overrides.max_iterations {
            self.loop_policy.max_iterations = max;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.verify.concurrency = concurrency;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("run.fail_threshold", self.run.fail_threshold, 0.0, 100.0)?;
        check_range("loop.epsilon", self.loop_policy.epsilon, 0.0, 1.0)?;
        check_range("verify.confidence_floor", self.verify.confidence_floor, 0.0, 1.0)?;
        check_range(
            "extract.similarity_threshold",
            self.extract.similarity_threshold,
            0.0,
            1.0,
        )?;
        check_positive("loop.max_iterations", self.loop_policy.max_iterations as u64)?;
        check_positive("loop.stall_window", self.loop_policy.stall_window as u64)?;
        check_positive("verify.concurrency", self.verify.concurrency as u64)?;
        check_positive("verify.samples", self.verify.samples as u64)?;
        check_positive("generate.max_attempts", self.generate.max_attempts as u64)?;
        check_positive("generate.timeout_ms", self.generate.timeout_ms)?;
        if self.generate.max_backoff_ms < self.generate.initial_backoff_ms {
            return Err(ConfigError::ValidationFailed {
                field: "generate.max_backoff_ms".to_string(),
                message: "must be at least generate.initial_backoff_ms".to_string(),
            });
        }
        Ok(())
    }
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: format!("{ENV_PREFIX}{name}"),
        message,
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| invalid(name, format!("{raw:?}: {e}")))
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || !(min..=max).contains(&value) {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: format!("must be between {min} and {max}"),
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}
