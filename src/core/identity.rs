//! Resource identities and source attribution.

use std::fmt;
use std::path::{Path, PathBuf};

/// The identity of a registered resource: its type and its name.
///
/// Identities are unique within a [`Registry`](crate::core::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub module_type: String,
    pub module_name: String,
}

impl ResourceId {
    pub fn new(module_type: impl Into<String>, module_name: impl Into<String>) -> Self {
        ResourceId {
            module_type: module_type.into(),
            module_name: module_name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module_type, self.module_name)
    }
}

/// The source file whose execution produced a set of identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceAttribution {
    /// Absolute path of the source file
    pub path: PathBuf,

    /// Logical dotted name of the source file (e.g. `plugins.nested.alpha`)
    pub source_name: String,
}

impl SourceAttribution {
    pub fn new(path: impl Into<PathBuf>, source_name: impl Into<String>) -> Self {
        SourceAttribution {
            path: path.into(),
            source_name: source_name.into(),
        }
    }

    /// The default resource type for this file: its parent directory's name.
    pub fn default_type(&self) -> Option<&str> {
        self.path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    }
}
