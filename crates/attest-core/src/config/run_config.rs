use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::ScanMode;

/// Which generator credential/routing path is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// Bring your own key: call the model provider directly.
    #[default]
    Byok,
    /// Route through the hosted generation API.
    ApiHosted,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Byok => "byok",
            Self::ApiHosted => "api-hosted",
        })
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "byok" => Ok(Self::Byok),
            "api-hosted" | "api_hosted" | "hosted" => Ok(Self::ApiHosted),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Invoker-facing run options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root used to resolve the codebase snapshot.
    pub working_directory: PathBuf,
    pub scan_mode: ScanMode,
    /// Compliance scores below this are a policy failure.
    pub fail_threshold: f64,
    /// Provenance string for where claims originate.
    pub doc_source: String,
    pub mode: GenerationMode,
    /// Files larger than this are skipped by the workspace scanner.
    pub max_file_size: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            working_directory: PathBuf::from(defaults::DEFAULT_WORKING_DIRECTORY),
            scan_mode: ScanMode::Full,
            fail_threshold: defaults::DEFAULT_FAIL_THRESHOLD,
            doc_source: defaults::DEFAULT_DOC_SOURCE.to_string(),
            mode: GenerationMode::Byok,
            max_file_size: defaults::DEFAULT_MAX_FILE_SIZE,
        }
    }
}
