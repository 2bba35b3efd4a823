//! Declarative source files.
//!
//! A declaration file is a TOML document with one `[[resource]]` table per
//! resource it registers:
//!
//! ```toml
//! [[resource]]
//! class = "AlphaModel"   # intrinsic name, registered as `alpha_model`
//!
//! [[resource]]
//! name = "foo"           # explicit name
//! type = "models"        # explicit type; defaults to the parent directory
//! class = "Foo"
//! [resource.params]
//! depth = 3
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::registry::Registry;
use crate::core::resource::Resource;
use crate::sources::loader::Loader;
use crate::util::fs::read_to_string;

/// A resource declared in a TOML source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// The declared class name, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Free-form parameters
    #[serde(default)]
    pub params: toml::Table,
}

impl Resource for Declaration {
    fn intrinsic_name(&self) -> Option<&str> {
        self.class.as_deref()
    }
}

/// One `[[resource]]` table.
#[derive(Debug, Deserialize)]
struct DeclaredResource {
    name: Option<String>,

    #[serde(rename = "type")]
    module_type: Option<String>,

    class: Option<String>,

    #[serde(default)]
    params: toml::Table,
}

/// A parsed declaration file.
#[derive(Debug, Default, Deserialize)]
struct DeclarationFile {
    #[serde(default)]
    resource: Vec<DeclaredResource>,
}

/// Loads declaration files, registering each declared resource.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationLoader;

impl DeclarationLoader {
    pub fn new() -> Self {
        DeclarationLoader
    }
}

impl Loader<Declaration> for DeclarationLoader {
    fn execute(
        &mut self,
        path: &Path,
        source_name: &str,
        registry: &mut Registry<Declaration>,
    ) -> Result<()> {
        let content = read_to_string(path)?;
        let file: DeclarationFile = toml::from_str(&content)
            .with_context(|| format!("failed to parse declarations in {}", path.display()))?;

        tracing::debug!(
            "executing {} ({} declarations)",
            source_name,
            file.resource.len()
        );

        for declared in file.resource {
            let declaration = Declaration {
                class: declared.class,
                params: declared.params,
            };
            registry
                .register_inline(
                    declaration,
                    declared.name.as_deref(),
                    declared.module_type.as_deref(),
                )
                .with_context(|| format!("failed to register resource from {}", path.display()))?;
        }

        Ok(())
    }
}
