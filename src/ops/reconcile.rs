//! Incremental reconciliation of the index against the source tree.
//!
//! A reconciliation hashes every source file, re-executes only the files
//! whose hash changed, prunes files that disappeared, and writes the index
//! back only when one of those things happened.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::index::{IndexDocument, IndexEntry};
use crate::core::resource::Resource;
use crate::ops::system::RegistrationSystem;
use crate::sources::loader::Loader;
use crate::sources::walk::{Exclusion, SourceFile, SourceWalker};
use crate::util::hash::sha256_file;

/// Namespace segment under which external roots are named.
pub const EXTERNAL_NAMESPACE: &str = "externally_loaded_modules";

/// What to reconcile and where the index lives.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Root directory scanned for source files
    pub root: PathBuf,

    /// Path of the index document
    pub index_path: PathBuf,

    /// Namespace prefix for source names under `root`
    pub namespace: String,

    /// Additional roots, named `<namespace>.externally_loaded_modules.module<i>`
    pub external_roots: Vec<PathBuf>,

    /// Paths or glob patterns to skip, relative to `root`
    pub exclude: Vec<String>,
}

impl ReconcileOptions {
    pub fn new(
        root: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        namespace: impl Into<String>,
    ) -> Self {
        ReconcileOptions {
            root: root.into(),
            index_path: index_path.into(),
            namespace: namespace.into(),
            external_roots: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Also scan an external root.
    pub fn with_external_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.external_roots.push(root.into());
        self
    }

    /// Skip a path or pattern relative to the root.
    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude.push(exclude.into());
        self
    }

    /// Namespace for the `i`-th external root.
    pub fn external_namespace(&self, i: usize) -> String {
        format!("{}.{}.module{}", self.namespace, EXTERNAL_NAMESPACE, i)
    }
}

/// Enumerate the source files of the root and every external root.
///
/// A file reachable from more than one root is kept once, under the first
/// root that reaches it.
pub fn collect_sources(options: &ReconcileOptions, walker: &SourceWalker) -> Result<Vec<SourceFile>> {
    let root = options
        .root
        .canonicalize()
        .with_context(|| format!("source root does not exist: {}", options.root.display()))?;
    let exclusions = Exclusion::resolve_all(&root, &options.exclude)?;

    let mut sources = walker.walk(&root, &options.namespace, &exclusions)?;
    for (i, external) in options.external_roots.iter().enumerate() {
        let namespace = options.external_namespace(i);
        sources.extend(walker.walk(external, &namespace, &exclusions)?);
    }

    let mut seen = HashSet::new();
    sources.retain(|source| seen.insert(source.path.clone()));
    Ok(sources)
}

/// The difference between an index and the current source tree.
#[derive(Debug)]
pub struct ReconcilePlan {
    /// The index as loaded
    pub document: IndexDocument,

    /// Every current source file
    pub sources: Vec<SourceFile>,

    /// Fresh content hash of every current source file
    pub hashes: BTreeMap<PathBuf, String>,

    /// Source files that are new or whose hash changed
    pub changed: Vec<SourceFile>,

    /// Tracked paths that are no longer part of the tree
    pub removed: Vec<PathBuf>,
}

impl ReconcilePlan {
    /// Whether applying the plan would leave the index as it is.
    pub fn is_up_to_date(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }

    /// Whether a changed source has never been indexed before.
    pub fn is_new(&self, source: &SourceFile) -> bool {
        self.document.hash_of(&source.path).is_none()
    }
}

/// Compare an index with the current source files.
///
/// Files are hashed in parallel; nothing is loaded.
pub fn plan_reconcile(document: IndexDocument, sources: Vec<SourceFile>) -> Result<ReconcilePlan> {
    let hashes = sources
        .par_iter()
        .map(|source| sha256_file(&source.path).map(|hash| (source.path.clone(), hash)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let current: HashSet<&Path> = sources.iter().map(|s| s.path.as_path()).collect();
    let removed: Vec<PathBuf> = document
        .tracked_paths()
        .into_iter()
        .filter(|path| !current.contains(path.as_path()))
        .collect();

    let changed: Vec<SourceFile> = sources
        .iter()
        .filter(|source| {
            let fresh = hashes.get(&source.path).map(String::as_str);
            let unchanged = document.hash_of(&source.path) == fresh;
            if unchanged {
                tracing::debug!("unchanged: {}", source.path.display());
            }
            !unchanged
        })
        .cloned()
        .collect();

    Ok(ReconcilePlan {
        document,
        sources,
        hashes,
        changed,
        removed,
    })
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of source files found
    pub scanned: usize,

    /// Files that were re-executed
    pub loaded: Vec<PathBuf>,

    /// Files whose entries were pruned
    pub pruned: Vec<PathBuf>,

    /// Whether the index was rewritten
    pub written: bool,
}

impl<R: Resource, L: Loader<R>> RegistrationSystem<R, L> {
    /// Bring the index at `options.index_path` up to date with the tree.
    pub fn generate_config(&mut self, options: &ReconcileOptions) -> Result<ReconcileReport> {
        let document = self.load_index_for_update(&options.index_path)?;
        let sources = collect_sources(options, &self.walker)?;
        let plan = plan_reconcile(document, sources)?;
        self.apply_plan(plan, &options.index_path)
    }

    /// Apply a plan: prune, re-execute changed files, write if needed.
    pub fn apply_plan(&mut self, plan: ReconcilePlan, index_path: &Path) -> Result<ReconcileReport> {
        let ReconcilePlan {
            mut document,
            sources,
            hashes,
            changed,
            removed,
        } = plan;

        for path in &removed {
            tracing::debug!("pruned: {}", path.display());
            document.remove_source(path);
        }

        for source in &changed {
            let attribution = source.attribution();
            self.load_source(&attribution)?;

            let entries: Vec<IndexEntry> = self
                .registry
                .attributed(&source.path)
                .map(|id| IndexEntry::new(id, &attribution))
                .collect();
            tracing::debug!(
                "indexed {} resources from {}",
                entries.len(),
                source.path.display()
            );
            document.replace_entries(&source.path, entries);
        }

        let written = !removed.is_empty() || !changed.is_empty();
        if written {
            document.hashes = hashes;
            document.save(index_path)?;
        }

        tracing::info!(
            "reconciled {} sources ({} loaded, {} pruned{})",
            sources.len(),
            changed.len(),
            removed.len(),
            if written { "" } else { ", index unchanged" }
        );

        Ok(ReconcileReport {
            scanned: sources.len(),
            loaded: changed.into_iter().map(|source| source.path).collect(),
            pruned: removed,
            written,
        })
    }
}
