//! Source tree enumeration.
//!
//! Walks a root directory and yields every source file below it together
//! with its dotted source name: `<namespace>.<dir>.<file stem>`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

use crate::core::identity::SourceAttribution;
use crate::util::context::DEFAULT_EXTENSION;
use crate::util::fs::normalize_path;

/// A source file found under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute, canonical path
    pub path: PathBuf,

    /// Dotted logical name
    pub source_name: String,
}

impl SourceFile {
    pub fn attribution(&self) -> SourceAttribution {
        SourceAttribution::new(&self.path, &self.source_name)
    }
}

/// A path or pattern excluded from the walk.
#[derive(Debug, Clone)]
pub enum Exclusion {
    /// Everything at or below this absolute path
    Path(PathBuf),
    /// Absolute paths matching this glob
    Pattern(glob::Pattern),
}

impl Exclusion {
    /// Resolve an exclusion relative to `root`.
    ///
    /// Entries containing glob metacharacters become patterns; anything else
    /// is a path prefix.
    pub fn resolve(root: &Path, raw: &str) -> Result<Self> {
        if raw.contains(['*', '?', '[']) {
            let root = glob::Pattern::escape(&root.to_string_lossy());
            let pattern = glob::Pattern::new(&format!("{}/{}", root, raw))
                .with_context(|| format!("invalid exclude pattern: {}", raw))?;
            Ok(Exclusion::Pattern(pattern))
        } else {
            Ok(Exclusion::Path(normalize_path(&root.join(raw))))
        }
    }

    /// Resolve a list of exclusions relative to `root`.
    pub fn resolve_all(root: &Path, raw: &[String]) -> Result<Vec<Self>> {
        raw.iter().map(|r| Self::resolve(root, r)).collect()
    }

    pub fn matches(&self, path: &Path) -> bool {
        match self {
            Exclusion::Path(prefix) => path.starts_with(prefix),
            Exclusion::Pattern(pattern) => pattern.matches_path(path),
        }
    }
}

/// Enumerates source files by extension.
#[derive(Debug, Clone)]
pub struct SourceWalker {
    extensions: Vec<String>,
}

impl Default for SourceWalker {
    fn default() -> Self {
        SourceWalker::new([DEFAULT_EXTENSION])
    }
}

impl SourceWalker {
    /// Create a walker for files with any of the given extensions.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceWalker {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Walk `root` and return its source files in path order.
    ///
    /// Hidden files and directories are skipped, as is anything matched by
    /// `exclusions`.
    pub fn walk(
        &self,
        root: &Path,
        namespace: &str,
        exclusions: &[Exclusion],
    ) -> Result<Vec<SourceFile>> {
        let root = root
            .canonicalize()
            .with_context(|| format!("source root does not exist: {}", root.display()))?;

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                (entry.depth() == 0 || !is_hidden(entry))
                    && !exclusions.iter().any(|e| e.matches(entry.path()))
            });

        for entry in walker {
            let entry =
                entry.with_context(|| format!("failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }

            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            files.push(SourceFile {
                path: entry.path().to_path_buf(),
                source_name: source_name(namespace, relative),
            });
        }

        tracing::debug!("found {} source files under {}", files.len(), root.display());
        Ok(files)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Build the dotted name of a file relative to its root.
fn source_name(namespace: &str, relative: &Path) -> String {
    let stem = relative.with_extension("");
    let mut parts: Vec<String> = Vec::new();
    if !namespace.is_empty() {
        parts.push(namespace.to_string());
    }
    parts.extend(
        stem.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join(".")
}
