//! The durable index document.
//!
//! The index pairs a content hash per source file with a flat list of
//! entries saying which file declares which identity. It is stored as
//! pretty-printed JSON:
//!
//! ```json
//! {
//!   "config": [
//!     {
//!       "module_type": "plugins",
//!       "module_name": "foo",
//!       "source_path": "/work/plugins/alpha.toml",
//!       "source_name": "plugins.alpha"
//!     }
//!   ],
//!   "hashes": {
//!     "/work/plugins/alpha.toml": "2cf24dba..."
//!   }
//! }
//! ```
//!
//! Unknown keys are ignored. A missing document reads as an empty one; a
//! document that does not parse is reported as [`RegistryError::Corrupted`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::errors::RegistryError;
use crate::core::identity::{ResourceId, SourceAttribution};
use crate::util::fs::{read_to_string, write_atomic};

/// One identity and the source file that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub module_type: String,
    pub module_name: String,
    pub source_path: PathBuf,
    pub source_name: String,
}

impl IndexEntry {
    pub fn new(id: &ResourceId, source: &SourceAttribution) -> Self {
        IndexEntry {
            module_type: id.module_type.clone(),
            module_name: id.module_name.clone(),
            source_path: source.path.clone(),
            source_name: source.source_name.clone(),
        }
    }

    pub fn source(&self) -> SourceAttribution {
        SourceAttribution::new(&self.source_path, &self.source_name)
    }

    pub fn matches(&self, module_type: &str, module_name: &str) -> bool {
        self.module_type == module_type && self.module_name == module_name
    }
}

/// The full index: entries plus the content hash of every tracked file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub config: Vec<IndexEntry>,

    #[serde(default)]
    pub hashes: BTreeMap<PathBuf, String>,
}

impl IndexDocument {
    /// Load the index from a file. A missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Save the index, replacing the previous document atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(self).context("failed to serialize index")?;
        content.push('\n');
        write_atomic(path, content.as_bytes())
    }

    /// Entries declared by a source file.
    pub fn entries_for<'a, 'p>(&'a self, path: &'p Path) -> impl Iterator<Item = &'a IndexEntry> + 'p
    where
        'a: 'p,
    {
        self.config.iter().filter(move |entry| entry.source_path == path)
    }

    /// Replace every entry of `path` with `entries`.
    pub fn replace_entries(&mut self, path: &Path, entries: impl IntoIterator<Item = IndexEntry>) {
        self.config.retain(|entry| entry.source_path != path);
        self.config.extend(entries);
    }

    /// Forget a source file: its entries and its hash.
    pub fn remove_source(&mut self, path: &Path) {
        self.config.retain(|entry| entry.source_path != path);
        self.hashes.remove(path);
    }

    /// Every path the index knows about, through entries or hashes.
    pub fn tracked_paths(&self) -> BTreeSet<PathBuf> {
        self.config
            .iter()
            .map(|entry| entry.source_path.clone())
            .chain(self.hashes.keys().cloned())
            .collect()
    }

    /// Recorded hash of a source file.
    pub fn hash_of(&self, path: &Path) -> Option<&str> {
        self.hashes.get(path).map(String::as_str)
    }
}

/// A read-only view of the index whose entries are validated lazily.
///
/// Resolution only cares about the first matching entry, so a malformed
/// entry is reported when the scan reaches it rather than when the file is
/// read.
#[derive(Debug, Default, Deserialize)]
pub struct RawIndex {
    #[serde(default)]
    config: Vec<serde_json::Value>,
}

impl RawIndex {
    /// Load the index from a file. A missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Find the entry declaring `(module_type, module_name)`.
    ///
    /// Scans in order and stops at the first match. Only the identity of
    /// each entry is checked on the way; an entry whose identity is
    /// unreadable, or a matching entry that is incomplete, is an error.
    pub fn find(
        &self,
        module_type: &str,
        module_name: &str,
        index_path: &Path,
    ) -> Result<Option<IndexEntry>, RegistryError> {
        let malformed = |i: usize, detail: String| RegistryError::Corrupted {
            index_path: index_path.to_path_buf(),
            detail: format!("entry {} is malformed: {}", i, detail),
        };

        for (i, value) in self.config.iter().enumerate() {
            let field = |key: &str| {
                value
                    .get(key)
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| malformed(i, format!("`{}` is missing or not a string", key)))
            };
            if field("module_type")? != module_type || field("module_name")? != module_name {
                continue;
            }

            let entry = IndexEntry::deserialize(value).map_err(|e| malformed(i, e.to_string()))?;
            return Ok(Some(entry));
        }
        Ok(None)
    }
}

fn read_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = read_to_string(path)?;
    let document = serde_json::from_str(&content).map_err(|e| RegistryError::Corrupted {
        index_path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(document)
}

/// Check whether an error is index corruption.
pub fn is_corruption(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::Corrupted { .. })
    )
}
