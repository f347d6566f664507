//! Read-only codebase snapshot shared by the generator and checkers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Whether every claim is re-checked each iteration, or only claims a
/// changed file could affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Full,
    Changed,
}

/// One source file captured in a snapshot.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the snapshot root.
    pub path: PathBuf,
    pub content: Arc<str>,
    /// xxh3 hash of the content.
    pub content_hash: u64,
    pub language: Option<&'static str>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        let content: Arc<str> = content.into();
        Self {
            content_hash: xxh3_64(content.as_bytes()),
            language: language_for_path(&path),
            path,
            content,
        }
    }

    /// Path rendered with forward slashes for evidence output.
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// Immutable view of the codebase at the top of one iteration.
#[derive(Debug, Clone)]
pub struct CodebaseSnapshot {
    root: PathBuf,
    files: Vec<SourceFile>,
    /// `Some` in changed-scan mode: relative paths that changed.
    changed: Option<FxHashSet<PathBuf>>,
    fingerprint: u64,
}

impl CodebaseSnapshot {
    /// Build a snapshot. Files are sorted by path for deterministic output.
    pub fn new(root: impl Into<PathBuf>, mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let fingerprint = fingerprint_of(&files);
        Self {
            root: root.into(),
            files,
            changed: None,
            fingerprint,
        }
    }

    /// Convenience constructor from `(path, content)` pairs.
    pub fn from_sources<P, C, I>(root: impl Into<PathBuf>, sources: I) -> Self
    where
        P: Into<PathBuf>,
        C: Into<Arc<str>>,
        I: IntoIterator<Item = (P, C)>,
    {
        let files = sources
            .into_iter()
            .map(|(path, content)| SourceFile::new(path, content))
            .collect();
        Self::new(root, files)
    }

    /// Mark the paths that changed since the previous snapshot, including
    /// removed ones.
    pub fn with_changed(mut self, changed: FxHashSet<PathBuf>) -> Self {
        self.changed = Some(changed);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Files to put in front of the generator: all files, or only the
    /// changed ones.
    pub fn targets(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(move |f| self.is_changed(&f.path))
    }

    /// Whether `path` changed since the previous snapshot. Always true in
    /// full mode.
    pub fn is_changed(&self, path: &Path) -> bool {
        self.changed
            .as_ref()
            .map_or(true, |changed| changed.contains(path))
    }

    /// False only for a changed-mode snapshot with nothing changed.
    pub fn has_changes(&self) -> bool {
        self.changed.as_ref().map_or(true, |changed| !changed.is_empty())
    }

    pub fn scan_mode(&self) -> ScanMode {
        if self.changed.is_some() {
            ScanMode::Changed
        } else {
            ScanMode::Full
        }
    }

    /// Hash over sorted `(path, content_hash)` pairs.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }

    /// Most frequent detected language, ties broken alphabetically.
    pub fn primary_language(&self) -> Option<&'static str> {
        let mut counts: FxHashMap<&'static str, usize> = FxHashMap::default();
        for lang in self.files.iter().filter_map(|f| f.language) {
            *counts.entry(lang).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(lang, _)| lang)
    }
}

fn fingerprint_of(files: &[SourceFile]) -> u64 {
    let mut hasher = Xxh3::new();
    for file in files {
        hasher.update(file.path.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(&file.content_hash.to_le_bytes());
    }
    hasher.digest()
}

/// Detect a language from the file extension.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let lang = match ext.as_str() {
        "rs" => "rust",
        "ts" | "tsx" | "mts" | "cts" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "py" | "pyi" => "python",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "cs" => "csharp",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "swift" => "swift",
        _ => return None,
    };
    Some(lang)
}
