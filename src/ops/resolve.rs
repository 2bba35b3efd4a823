//! Lazy resolution of a single resource.

use std::path::Path;

use anyhow::Result;

use crate::core::errors::RegistryError;
use crate::core::index::{is_corruption, IndexEntry, RawIndex};
use crate::core::resource::Resource;
use crate::ops::system::RegistrationSystem;
use crate::sources::loader::Loader;

impl<R: Resource, L: Loader<R>> RegistrationSystem<R, L> {
    /// Get a resource, loading the one source file that declares it if it
    /// is not registered yet.
    ///
    /// At most one file is loaded per call. A malformed index runs the
    /// corruption handler and fails with [`RegistryError::Corrupted`].
    pub fn get_module(
        &mut self,
        module_type: &str,
        module_name: &str,
        index_path: &Path,
    ) -> Result<&R> {
        if !self.registry.contains(module_type, module_name) {
            let entry = self
                .find_entry(module_type, module_name, index_path)?
                .ok_or_else(|| RegistryError::not_found(module_type, module_name))?;

            tracing::debug!(
                "resolving `{}:{}` from {}",
                module_type,
                module_name,
                entry.source_path.display()
            );
            self.load_source(&entry.source())?;
        }

        self.registry
            .lookup(module_type, module_name)
            .ok_or_else(|| RegistryError::not_found(module_type, module_name).into())
    }

    /// Find the index entry declaring an identity without loading anything.
    ///
    /// Corruption is handed to the corruption handler before the error is
    /// returned.
    pub fn find_entry(
        &self,
        module_type: &str,
        module_name: &str,
        index_path: &Path,
    ) -> Result<Option<IndexEntry>> {
        let index = match RawIndex::load(index_path) {
            Ok(index) => index,
            Err(e) => {
                if is_corruption(&e) {
                    tracing::warn!("{:#}", e);
                    self.recover(index_path);
                }
                return Err(e);
            }
        };

        match index.find(module_type, module_name, index_path) {
            Ok(entry) => Ok(entry),
            Err(e) => {
                tracing::warn!("{}", e);
                self.recover(index_path);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::IndexDocument;
    use crate::ops::recovery::quarantine_path;
    use crate::sources::declared::DeclarationLoader;
    use crate::test_support::{declare, Scenario};
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    fn indexed() -> Scenario {
        let scenario = Scenario::new();
        scenario
            .system()
            .generate_config(&scenario.options())
            .unwrap();
        scenario
    }

    fn write_index(scenario: &Scenario, content: &str) {
        fs::create_dir_all(scenario.index.parent().unwrap()).unwrap();
        fs::write(&scenario.index, content).unwrap();
    }

    #[test]
    fn test_lazy_resolution_loads_one_file_once() {
        let scenario = indexed();
        let mut system = scenario.system();

        let foo = system.get_module("plugins", "foo", &scenario.index).unwrap();
        assert!(foo.class.is_none());
        assert_eq!(system.loader().count(), 1);
        assert_eq!(system.loader().loads_of(&scenario.source("alpha.toml")), 1);

        system.get_module("plugins", "foo", &scenario.index).unwrap();
        assert_eq!(system.loader().count(), 1);
        assert!(system.lookup("plugins", "bar").is_none());
    }

    #[test]
    fn test_not_found_names_identity() {
        let scenario = indexed();
        let mut system = scenario.system();

        let err = system
            .get_module("plugins", "missing", &scenario.index)
            .unwrap_err();
        assert_eq!(err.to_string(), "the resource `plugins:missing` was not found");
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::NotFound { .. })
        ));
        assert_eq!(system.loader().count(), 0);
    }

    #[test]
    fn test_missing_index_is_not_found() {
        let scenario = Scenario::new();
        let mut system = scenario.system();

        let err = system.get_module("plugins", "foo", &scenario.index).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_registered_resource_needs_no_index() {
        let scenario = Scenario::new();
        let mut system = scenario.system();
        system
            .register_inline(
                crate::sources::declared::Declaration {
                    class: Some("Inline".to_string()),
                    params: toml::Table::new(),
                },
                None,
                Some("plugins"),
            )
            .unwrap();

        let found = system.get_module("plugins", "inline", &scenario.index).unwrap();
        assert_eq!(found.class.as_deref(), Some("Inline"));
        assert!(!scenario.index.exists());
    }

    #[test]
    fn test_malformed_entry_runs_recovery() {
        let scenario = Scenario::new();
        write_index(
            &scenario,
            r#"{"config": [{"module_type": "plugins", "module_name": 7}], "hashes": {}}"#,
        );

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut system = scenario
            .system()
            .with_recovery(move |_: &Path| -> Result<()> {
                counter.set(counter.get() + 1);
                Ok(())
            });

        let err = system.get_module("plugins", "foo", &scenario.index).unwrap_err();
        assert!(is_corruption(&err));
        assert_eq!(calls.get(), 1);
        assert_eq!(system.loader().count(), 0);
    }

    #[test]
    fn test_unrelated_incomplete_entry_is_skipped() {
        let scenario = indexed();
        let mut document = scenario.document();
        let mut config: Vec<serde_json::Value> = document
            .config
            .drain(..)
            .map(|entry| serde_json::to_value(entry).unwrap())
            .collect();
        config.insert(
            0,
            serde_json::json!({"module_type": "models", "module_name": "other"}),
        );
        let raw = serde_json::json!({"config": config, "hashes": document.hashes});
        write_index(&scenario, &raw.to_string());

        let mut system = scenario.system();
        let bar = system.get_module("plugins", "bar", &scenario.index);
        assert!(bar.is_ok());
        assert!(scenario.index.exists());
        assert!(!quarantine_path(&scenario.index).exists());
    }

    #[test]
    fn test_unparseable_index_is_quarantined() {
        let scenario = Scenario::new();
        write_index(&scenario, "[ truncated");

        let mut system = scenario.system();
        let err = system.get_module("plugins", "foo", &scenario.index).unwrap_err();
        assert!(is_corruption(&err));
        assert!(!scenario.index.exists());
        assert!(quarantine_path(&scenario.index).exists());

        // The next reconciliation starts over and resolution works again.
        system.generate_config(&scenario.options()).unwrap();
        assert!(system.get_module("plugins", "foo", &scenario.index).is_ok());
    }

    #[test]
    fn test_entry_without_declaration_is_not_found() {
        let scenario = indexed();
        scenario.write("alpha.toml", &declare(&["renamed"]));

        let mut system = scenario.system();
        let err = system.get_module("plugins", "foo", &scenario.index).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::NotFound { .. })
        ));
        assert_eq!(system.loader().count(), 1);
        assert!(system.lookup("plugins", "renamed").is_some());
    }

    #[test]
    fn test_find_entry_does_not_load() {
        let scenario = indexed();
        let system = scenario.system();

        let entry = system
            .find_entry("plugins", "bar", &scenario.index)
            .unwrap()
            .unwrap();
        assert_eq!(entry.source_path, scenario.source("beta.toml"));
        assert_eq!(entry.source_name, "plugins.beta");
        assert_eq!(system.loader().count(), 0);
    }

    #[test]
    fn test_plain_loader_resolution() {
        let scenario = indexed();
        let mut system = crate::ops::system::DeclarationSystem::new(DeclarationLoader);

        system.get_module("plugins", "bar", &scenario.index).unwrap();
        let document = IndexDocument::load(&scenario.index).unwrap();
        assert_eq!(document.config.len(), 2);
    }
}
