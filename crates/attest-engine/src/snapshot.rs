//! Codebase sources: filesystem walker and in-memory snapshots.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ignore::WalkBuilder;
use rustc_hash::{FxHashMap, FxHashSet};

use attest_core::config::RunConfig;
use attest_core::errors::SnapshotError;
use attest_core::models::{CodebaseSnapshot, ScanMode, SourceFile};
use attest_core::traits::CodebaseSource;

/// Directories never worth reading, even without a `.gitignore`.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
    "coverage",
    ".cache",
    ".next",
    "vendor",
];

/// Bytes inspected for a NUL when sniffing binary content.
const BINARY_SNIFF_BYTES: usize = 8192;

/// Walks the working directory with `ignore` (honours `.gitignore`).
///
/// In `changed` scan mode the snapshot records the files whose content hash
/// differs from the previous call's, plus files that disappeared since. The
/// first call treats every file as changed.
#[derive(Debug)]
pub struct WorkspaceSource {
    root: PathBuf,
    scan_mode: ScanMode,
    max_file_size: u64,
    previous: Mutex<Option<FxHashMap<PathBuf, u64>>>,
}

impl WorkspaceSource {
    pub fn new(root: impl Into<PathBuf>, scan_mode: ScanMode, max_file_size: u64) -> Self {
        Self {
            root: root.into(),
            scan_mode,
            max_file_size,
            previous: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            config.working_directory.clone(),
            config.scan_mode,
            config.max_file_size,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_files(&self) -> Result<Vec<SourceFile>, SnapshotError> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                !(entry.depth() > 0
                    && entry.file_type().is_some_and(|t| t.is_dir())
                    && DEFAULT_IGNORE_DIRS.contains(&name.as_ref()))
            })
            .build();

        let mut files = Vec::new();
        let mut skipped = 0usize;
        for entry in walker {
            let entry = entry.map_err(|e| SnapshotError::Walk {
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let too_large = entry
                .metadata()
                .map(|m| m.len() > self.max_file_size)
                .unwrap_or(false);
            if too_large {
                skipped += 1;
                continue;
            }
            let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
            if sniff.contains(&0) {
                skipped += 1;
                continue;
            }
            let Ok(content) = String::from_utf8(bytes) else {
                skipped += 1;
                continue;
            };
            let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
            files.push(SourceFile::new(relative, content));
        }
        tracing::debug!(
            root = %self.root.display(),
            files = files.len(),
            skipped,
            "workspace scanned"
        );
        Ok(files)
    }
}

impl CodebaseSource for WorkspaceSource {
    fn snapshot(&self) -> Result<CodebaseSnapshot, SnapshotError> {
        if !self.root.is_dir() {
            return Err(SnapshotError::RootNotFound {
                path: self.root.display().to_string(),
            });
        }
        let files = self.read_files()?;
        let hashes: FxHashMap<PathBuf, u64> = files
            .iter()
            .map(|f| (f.path.clone(), f.content_hash))
            .collect();

        let mut previous = self.previous.lock().unwrap_or_else(|p| p.into_inner());
        let changed: Option<FxHashSet<PathBuf>> = match self.scan_mode {
            ScanMode::Full => None,
            ScanMode::Changed => {
                let mut changed: FxHashSet<PathBuf> = hashes
                    .iter()
                    .filter(|(path, hash)| {
                        previous
                            .as_ref()
                            .and_then(|prev| prev.get(*path))
                            .map_or(true, |old| old != *hash)
                    })
                    .map(|(path, _)| path.clone())
                    .collect();
                if let Some(prev) = previous.as_ref() {
                    changed.extend(prev.keys().filter(|p| !hashes.contains_key(*p)).cloned());
                }
                Some(changed)
            }
        };
        *previous = Some(hashes);
        drop(previous);

        let snapshot = CodebaseSnapshot::new(&self.root, files);
        Ok(match changed {
            Some(changed) => snapshot.with_changed(changed),
            None => snapshot,
        })
    }
}

/// In-memory snapshots, yielded in order; the last one repeats.
#[derive(Debug)]
pub struct StaticSource {
    queue: Mutex<VecDeque<CodebaseSnapshot>>,
}

impl StaticSource {
    pub fn new(snapshot: CodebaseSnapshot) -> Self {
        Self::sequence(vec![snapshot])
    }

    /// Yield `snapshots` one per call. An empty sequence yields empty
    /// snapshots rooted at `.`.
    pub fn sequence(snapshots: Vec<CodebaseSnapshot>) -> Self {
        Self {
            queue: Mutex::new(snapshots.into()),
        }
    }
}

impl CodebaseSource for StaticSource {
    fn snapshot(&self) -> Result<CodebaseSnapshot, SnapshotError> {
        let mut queue = self.queue.lock().unwrap_or_else(|p| p.into_inner());
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(next.unwrap_or_else(|| CodebaseSnapshot::new(".", Vec::new())))
    }
}
