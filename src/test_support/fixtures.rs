//! Source tree fixtures for common test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::index::IndexDocument;
use crate::ops::reconcile::ReconcileOptions;
use crate::ops::system::RegistrationSystem;
use crate::sources::declared::{Declaration, DeclarationLoader};
use crate::test_support::CountingLoader;

/// A system over declaration files whose loads are counted.
pub type CountingSystem = RegistrationSystem<Declaration, CountingLoader<DeclarationLoader>>;

/// Declaration file content registering one resource per name.
pub fn declare(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("[[resource]]\nname = \"{}\"\n", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A temporary source tree:
///
/// ```text
/// <tmp>/plugins/alpha.toml   declares plugins:foo
/// <tmp>/plugins/beta.toml    declares plugins:bar
/// <tmp>/.berth/index.json    the index (not created)
/// ```
pub struct Scenario {
    pub tmp: TempDir,
    /// Canonical source root
    pub root: PathBuf,
    pub index: PathBuf,
}

impl Scenario {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("plugins");
        fs::create_dir_all(&root).unwrap();
        let root = root.canonicalize().unwrap();
        let index = tmp.path().join(".berth").join("index.json");

        let scenario = Scenario { tmp, root, index };
        scenario.write("alpha.toml", &declare(&["foo"]));
        scenario.write("beta.toml", &declare(&["bar"]));
        scenario
    }

    /// Absolute path of a file under the root.
    pub fn source(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Write a file under the root, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) {
        let path = self.source(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn options(&self) -> ReconcileOptions {
        ReconcileOptions::new(&self.root, &self.index, "plugins")
    }

    /// A fresh system, as a new process would have.
    pub fn system(&self) -> CountingSystem {
        RegistrationSystem::new(CountingLoader::new(DeclarationLoader))
    }

    /// The index as currently on disk.
    pub fn document(&self) -> IndexDocument {
        IndexDocument::load(&self.index).unwrap()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}
