use std::fmt;

use serde::{Deserialize, Serialize};

use super::claim::Severity;

/// Kind of change a remediation item proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemediationAction {
    Add,
    Modify,
    Remove,
}

impl fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Remove => "remove",
        })
    }
}

/// One advisory fix for an unmet claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationItem {
    pub claim_id: String,
    pub title: String,
    pub description: String,
    pub action: RemediationAction,
    pub severity: Severity,
    pub code_guidance: String,
}
