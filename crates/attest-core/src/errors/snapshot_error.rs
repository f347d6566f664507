//! Codebase snapshot errors.

use super::error_code::{self, AttestErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("working directory not found: {path}")]
    RootNotFound { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("walk failed: {message}")]
    Walk { message: String },
}

impl AttestErrorCode for SnapshotError {
    fn error_code(&self) -> &'static str {
        error_code::SNAPSHOT_ERROR
    }
}
