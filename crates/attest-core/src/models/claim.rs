use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{CLAIM_ID_HEX_LEN, CLAIM_ID_PREFIX};

/// Claim severity. Declaration order makes `Critical` the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Weight used by the specification gap and issue ranking.
    pub fn weight(self) -> f64 {
        match self {
            Self::Critical => 4.0,
            Self::High => 3.0,
            Self::Medium => 2.0,
            Self::Low => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" | "crit" | "blocker" => Ok(Self::Critical),
            "high" | "major" => Ok(Self::High),
            "medium" | "med" | "moderate" => Ok(Self::Medium),
            "low" | "minor" | "info" => Ok(Self::Low),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Closed set of claim categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimCategory {
    Correctness,
    Security,
    Performance,
    ErrorHandling,
    EdgeCase,
    TypeSafety,
    DataPrivacy,
    Functionality,
    Operational,
    Legal,
}

impl ClaimCategory {
    pub const ALL: [ClaimCategory; 10] = [
        Self::Correctness,
        Self::Security,
        Self::Performance,
        Self::ErrorHandling,
        Self::EdgeCase,
        Self::TypeSafety,
        Self::DataPrivacy,
        Self::Functionality,
        Self::Operational,
        Self::Legal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correctness => "correctness",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::ErrorHandling => "error-handling",
            Self::EdgeCase => "edge-case",
            Self::TypeSafety => "type-safety",
            Self::DataPrivacy => "data-privacy",
            Self::Functionality => "functionality",
            Self::Operational => "operational",
            Self::Legal => "legal",
        }
    }
}

impl Default for ClaimCategory {
    fn default() -> Self {
        Self::Functionality
    }
}

impl fmt::Display for ClaimCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimCategory {
    type Err = String;

    /// Accepts kebab, snake, and spaced spellings plus a few common aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match key.as_str() {
            "correctness" | "logic" => Ok(Self::Correctness),
            "security" | "sec" => Ok(Self::Security),
            "performance" | "perf" => Ok(Self::Performance),
            "error-handling" | "errors" | "error" => Ok(Self::ErrorHandling),
            "edge-case" | "edge-cases" | "edge" => Ok(Self::EdgeCase),
            "type-safety" | "types" => Ok(Self::TypeSafety),
            "data-privacy" | "privacy" => Ok(Self::DataPrivacy),
            "functionality" | "feature" | "functional" => Ok(Self::Functionality),
            "operational" | "ops" => Ok(Self::Operational),
            "legal" | "compliance" | "license" => Ok(Self::Legal),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A single testable behavioral assertion about the codebase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Stable identifier: content hash or carried-forward id.
    pub id: String,
    /// Provenance tag, e.g. originating document section.
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub category: ClaimCategory,
    #[serde(default)]
    pub severity: Severity,
    pub text: String,
    /// Non-testable claims are retained for audit but never scored.
    #[serde(default = "default_testable")]
    pub testable: bool,
}

fn default_testable() -> bool {
    true
}

impl Claim {
    /// Create a testable claim whose id is the content hash of `text`.
    pub fn new(
        section: impl Into<String>,
        category: ClaimCategory,
        severity: Severity,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: Self::content_id(&text),
            section: section.into(),
            category,
            severity,
            text,
            testable: true,
        }
    }

    pub fn untestable(mut self) -> Self {
        self.testable = false;
        self
    }

    /// Content-hash identifier over the normalized text.
    pub fn content_id(text: &str) -> String {
        let normalized = normalize_text(text);
        let hex = blake3::hash(normalized.as_bytes()).to_hex();
        format!("{CLAIM_ID_PREFIX}{}", &hex.as_str()[..CLAIM_ID_HEX_LEN])
    }

    /// Normalized form of this claim's text.
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
