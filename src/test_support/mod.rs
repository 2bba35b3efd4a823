//! Test utilities for berth unit tests.
//!
//! Provides a loader wrapper that records which files were executed, and
//! fixtures for building small source trees on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::Scenario;
//!
//! #[test]
//! fn test_example() {
//!     let scenario = Scenario::new();
//!     let mut system = scenario.system();
//!     system.generate_config(&scenario.options()).unwrap();
//!     assert_eq!(system.loader().count(), 2);
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::registry::Registry;
use crate::sources::loader::Loader;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Wraps a loader and counts how often each file was executed.
#[derive(Debug, Clone, Default)]
pub struct CountingLoader<L> {
    inner: L,
    loads: HashMap<PathBuf, usize>,
}

impl<L> CountingLoader<L> {
    pub fn new(inner: L) -> Self {
        CountingLoader {
            inner,
            loads: HashMap::new(),
        }
    }

    /// Total number of executions.
    pub fn count(&self) -> usize {
        self.loads.values().sum()
    }

    /// Number of executions of one file.
    pub fn loads_of(&self, path: &Path) -> usize {
        self.loads.get(path).copied().unwrap_or(0)
    }
}

impl<R, L: Loader<R>> Loader<R> for CountingLoader<L> {
    fn execute(
        &mut self,
        path: &Path,
        source_name: &str,
        registry: &mut Registry<R>,
    ) -> Result<()> {
        *self.loads.entry(path.to_path_buf()).or_insert(0) += 1;
        self.inner.execute(path, source_name, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::SourceAttribution;
    use crate::sources::declared::{Declaration, DeclarationLoader};
    use tempfile::TempDir;

    #[test]
    fn test_counting_loader_records_executions() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("plugins");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("alpha.toml");
        std::fs::write(&path, declare(&["foo"])).unwrap();

        let mut loader = CountingLoader::new(DeclarationLoader);
        let mut registry: Registry<Declaration> = Registry::new();
        for _ in 0..2 {
            let source = SourceAttribution::new(&path, "plugins.alpha");
            registry
                .with_source(source, |registry| {
                    loader.execute(&path, "plugins.alpha", registry)
                })
                .unwrap();
        }

        assert_eq!(loader.count(), 2);
        assert_eq!(loader.loads_of(&path), 2);
        assert_eq!(loader.loads_of(Path::new("/elsewhere.toml")), 0);
        assert!(registry.contains("plugins", "foo"));
    }
}
