use crate::errors::SnapshotError;
use crate::models::CodebaseSnapshot;

/// Yields a fresh read-only snapshot of the (externally updated) codebase
/// at the top of every iteration.
pub trait CodebaseSource: Send + Sync {
    fn snapshot(&self) -> Result<CodebaseSnapshot, SnapshotError>;
}
