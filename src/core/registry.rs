//! In-memory resource registry.
//!
//! The registry maps `(module_type, module_name)` to a resource and remembers
//! which source file contributed each identity. Which file is "current" is
//! explicit state: the code that executes a source file wraps the execution
//! in [`Registry::with_source`], and every registration made inside reads
//! its default type and its attribution from there.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::core::errors::{InferredField, RegistryError};
use crate::core::identity::{ResourceId, SourceAttribution};
use crate::core::resource::Resource;
use crate::util::naming::snake_case;

/// Two-level mapping from resource type and name to the resource.
#[derive(Debug)]
pub struct Registry<R> {
    /// Resources by type, then by name
    resources: HashMap<String, HashMap<String, R>>,

    /// Identities contributed by each source file
    paths: HashMap<PathBuf, BTreeSet<ResourceId>>,

    /// Source files currently being executed, innermost last
    sources: Vec<SourceAttribution>,
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Registry {
            resources: HashMap::new(),
            paths: HashMap::new(),
            sources: Vec::new(),
        }
    }
}

impl<R: Resource> Registry<R> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decorator-style registration.
    ///
    /// Returns a function that registers the resource it is given and hands
    /// the stored resource back.
    pub fn register<'a>(
        &'a mut self,
        name: Option<&'a str>,
        module_type: Option<&'a str>,
    ) -> impl FnOnce(R) -> Result<&'a R, RegistryError> + 'a
    where
        R: 'a,
    {
        move |resource| {
            let registry = self;
            registry.register_inline(resource, name, module_type)
        }
    }

    /// Register a resource.
    ///
    /// A missing `module_type` defaults to the parent directory name of the
    /// current source file; a missing `name` defaults to the snake-cased
    /// intrinsic name of the resource. Registering a value equal to the one
    /// already bound is a no-op; registering a different one is a conflict.
    pub fn register_inline(
        &mut self,
        resource: R,
        name: Option<&str>,
        module_type: Option<&str>,
    ) -> Result<&R, RegistryError> {
        let source = self.sources.last().cloned();

        let module_type = match module_type {
            Some(module_type) => module_type.to_string(),
            None => source
                .as_ref()
                .and_then(SourceAttribution::default_type)
                .map(str::to_string)
                .ok_or_else(|| RegistryError::Inference {
                    what: InferredField::Type,
                    location: describe(source.as_ref()),
                })?,
        };

        let module_name = match name {
            Some(name) => name.to_string(),
            None => resource
                .intrinsic_name()
                .map(snake_case)
                .ok_or_else(|| RegistryError::Inference {
                    what: InferredField::Name,
                    location: describe(source.as_ref()),
                })?,
        };

        let id = ResourceId::new(module_type, module_name);

        if let Some(existing) = self.lookup(&id.module_type, &id.module_name) {
            if *existing != resource {
                return Err(RegistryError::Conflict { id });
            }
        }

        tracing::debug!("registered `{}`", id);

        if let Some(source) = source {
            self.paths.entry(source.path).or_default().insert(id.clone());
        }

        let stored: &R = self
            .resources
            .entry(id.module_type)
            .or_default()
            .entry(id.module_name)
            .or_insert(resource);
        Ok(stored)
    }

    /// Look up a resource by type and name.
    pub fn lookup(&self, module_type: &str, module_name: &str) -> Option<&R> {
        self.resources
            .get(module_type)
            .and_then(|modules| modules.get(module_name))
    }

    /// Check whether an identity is registered.
    pub fn contains(&self, module_type: &str, module_name: &str) -> bool {
        self.lookup(module_type, module_name).is_some()
    }

    /// Run `f` with `source` as the current source file.
    ///
    /// The file's previous attribution set is discarded first, so after `f`
    /// returns the set holds exactly what this execution registered.
    pub fn with_source<T>(
        &mut self,
        source: SourceAttribution,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.paths.remove(&source.path);
        self.sources.push(source);
        let result = f(self);
        self.sources.pop();
        result
    }

    /// The source file currently being executed, if any.
    pub fn current_source(&self) -> Option<&SourceAttribution> {
        self.sources.last()
    }

    /// Identities attributed to a source file, in sorted order.
    pub fn attributed(&self, path: &Path) -> impl Iterator<Item = &ResourceId> + '_ {
        self.paths.get(path).into_iter().flatten()
    }

    /// Get the number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.values().map(HashMap::len).sum()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn describe(source: Option<&SourceAttribution>) -> String {
    source
        .map(|s| s.path.display().to_string())
        .unwrap_or_else(|| "<no source file>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Plugin {
        class: Option<&'static str>,
        depth: u32,
    }

    impl Plugin {
        fn named(class: &'static str, depth: u32) -> Self {
            Plugin {
                class: Some(class),
                depth,
            }
        }

        fn anonymous(depth: u32) -> Self {
            Plugin { class: None, depth }
        }
    }

    impl Resource for Plugin {
        fn intrinsic_name(&self) -> Option<&str> {
            self.class
        }
    }

    fn alpha() -> SourceAttribution {
        SourceAttribution::new("/work/plugins/alpha.toml", "plugins.alpha")
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        let stored = registry
            .register_inline(Plugin::named("Foo", 1), Some("foo"), Some("plugins"))
            .unwrap();
        assert_eq!(stored.depth, 1);

        assert_eq!(registry.lookup("plugins", "foo"), Some(&Plugin::named("Foo", 1)));
        assert!(registry.lookup("plugins", "bar").is_none());
        assert!(registry.lookup("models", "foo").is_none());
    }

    #[test]
    fn test_decorator_form_returns_resource() {
        let mut registry = Registry::new();
        let stored = registry.register(None, Some("models"))(Plugin::named("ResNet", 50)).unwrap();
        assert_eq!(stored, &Plugin::named("ResNet", 50));
        assert!(registry.contains("models", "res_net"));
    }

    #[test]
    fn test_equal_reregistration_is_noop() {
        let mut registry = Registry::new();
        registry
            .register_inline(Plugin::named("Foo", 1), None, Some("plugins"))
            .unwrap();
        registry
            .register_inline(Plugin::named("Foo", 1), None, Some("plugins"))
            .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_registration_fails() {
        let mut registry = Registry::new();
        registry
            .register_inline(Plugin::named("Foo", 1), None, Some("plugins"))
            .unwrap();

        let err = registry
            .register_inline(Plugin::named("Foo", 2), None, Some("plugins"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { ref id } if id.to_string() == "plugins:foo"));

        // The first value survives.
        assert_eq!(registry.lookup("plugins", "foo").unwrap().depth, 1);
    }

    #[test]
    fn test_same_name_different_type_is_distinct() {
        let mut registry = Registry::new();
        registry
            .register_inline(Plugin::named("Foo", 1), None, Some("plugins"))
            .unwrap();
        registry
            .register_inline(Plugin::named("Foo", 2), None, Some("models"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_type_inferred_from_source_directory() {
        let mut registry = Registry::new();
        registry
            .with_source(alpha(), |registry| {
                registry.register_inline(Plugin::named("Foo", 1), None, None).map(|_| ())
            })
            .unwrap();

        assert!(registry.contains("plugins", "foo"));
        let ids: Vec<_> = registry
            .attributed(Path::new("/work/plugins/alpha.toml"))
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["plugins:foo"]);
    }

    #[test]
    fn test_type_inference_without_source_fails() {
        let mut registry = Registry::new();
        let err = registry
            .register_inline(Plugin::named("Foo", 1), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Inference {
                what: InferredField::Type,
                ..
            }
        ));
    }

    #[test]
    fn test_name_inference_failure_names_source() {
        let mut registry = Registry::new();
        let err = registry
            .with_source(alpha(), |registry| {
                registry.register_inline(Plugin::anonymous(1), None, None).map(|_| ())
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Inference {
                what: InferredField::Name,
                ..
            }
        ));
        assert!(err.to_string().contains("/work/plugins/alpha.toml"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reexecution_replaces_attribution() {
        let mut registry = Registry::new();
        registry
            .with_source(alpha(), |registry| {
                registry.register_inline(Plugin::named("Bar", 1), None, None).map(|_| ())
            })
            .unwrap();
        registry
            .with_source(alpha(), |registry| {
                registry.register_inline(Plugin::named("Baz", 1), None, None).map(|_| ())
            })
            .unwrap();

        let ids: Vec<_> = registry
            .attributed(Path::new("/work/plugins/alpha.toml"))
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["plugins:baz"]);

        // Registered resources are never removed.
        assert!(registry.contains("plugins", "bar"));
    }

    #[test]
    fn test_nested_sources() {
        let mut registry = Registry::<Plugin>::new();
        let outer = SourceAttribution::new("/work/models/outer.toml", "models.outer");

        registry.with_source(outer, |registry| {
            assert_eq!(registry.current_source().unwrap().source_name, "models.outer");
            registry.with_source(alpha(), |registry| {
                assert_eq!(registry.current_source().unwrap().source_name, "plugins.alpha");
            });
            assert_eq!(registry.current_source().unwrap().source_name, "models.outer");
        });

        assert!(registry.current_source().is_none());
    }
}
