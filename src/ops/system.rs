//! The registration system: a registry together with the collaborators it
//! needs to fill itself lazily.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::errors::RegistryError;
use crate::core::identity::SourceAttribution;
use crate::core::index::{is_corruption, IndexDocument};
use crate::core::registry::Registry;
use crate::core::resource::Resource;
use crate::ops::recovery::{CorruptionHandler, Quarantine};
use crate::sources::declared::{Declaration, DeclarationLoader};
use crate::sources::loader::Loader;
use crate::sources::walk::SourceWalker;

/// A system over TOML declaration files.
pub type DeclarationSystem = RegistrationSystem<Declaration, DeclarationLoader>;

/// Owns an in-memory registry and the loader that populates it.
///
/// Each system is independent; tests and hosts may hold as many as they
/// like. Reconciliation lives in [`ops::reconcile`](crate::ops::reconcile)
/// and resolution in [`ops::resolve`](crate::ops::resolve).
pub struct RegistrationSystem<R, L> {
    pub(crate) registry: Registry<R>,
    pub(crate) loader: L,
    pub(crate) walker: SourceWalker,
    pub(crate) recovery: Box<dyn CorruptionHandler>,
}

impl<R: Resource, L: Loader<R>> RegistrationSystem<R, L> {
    /// Create a system with the default walker and [`Quarantine`] recovery.
    pub fn new(loader: L) -> Self {
        RegistrationSystem {
            registry: Registry::new(),
            loader,
            walker: SourceWalker::default(),
            recovery: Box::new(Quarantine),
        }
    }

    /// Use a different source walker.
    pub fn with_walker(mut self, walker: SourceWalker) -> Self {
        self.walker = walker;
        self
    }

    /// Use a different corruption handler.
    pub fn with_recovery(mut self, recovery: impl CorruptionHandler + 'static) -> Self {
        self.recovery = Box::new(recovery);
        self
    }

    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn walker(&self) -> &SourceWalker {
        &self.walker
    }

    /// Decorator-style registration; see [`Registry::register`].
    pub fn register<'a>(
        &'a mut self,
        name: Option<&'a str>,
        module_type: Option<&'a str>,
    ) -> impl FnOnce(R) -> Result<&'a R, RegistryError> + 'a
    where
        R: 'a,
    {
        self.registry.register(name, module_type)
    }

    /// Direct registration; see [`Registry::register_inline`].
    pub fn register_inline(
        &mut self,
        resource: R,
        name: Option<&str>,
        module_type: Option<&str>,
    ) -> Result<&R, RegistryError> {
        self.registry.register_inline(resource, name, module_type)
    }

    /// In-memory lookup only.
    pub fn lookup(&self, module_type: &str, module_name: &str) -> Option<&R> {
        self.registry.lookup(module_type, module_name)
    }

    /// Execute one source file through the loader with it as the current
    /// source.
    pub fn load_source(&mut self, source: &SourceAttribution) -> Result<()> {
        let loader = &mut self.loader;
        self.registry
            .with_source(source.clone(), |registry| {
                loader.execute(&source.path, &source.source_name, registry)
            })
            .with_context(|| {
                format!(
                    "failed to load `{}` from {}",
                    source.source_name,
                    source.path.display()
                )
            })
    }

    /// Load the index for an update, recovering from corruption by starting
    /// over with an empty document.
    pub(crate) fn load_index_for_update(&self, index_path: &Path) -> Result<IndexDocument> {
        match IndexDocument::load(index_path) {
            Ok(document) => Ok(document),
            Err(e) if is_corruption(&e) => {
                tracing::warn!("{:#}; rebuilding the index from scratch", e);
                self.recover(index_path);
                Ok(IndexDocument::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Run the corruption handler. Its own failure is logged, never raised:
    /// the caller is already reporting the corruption.
    pub(crate) fn recover(&self, index_path: &Path) {
        if let Err(e) = self.recovery.recover(index_path) {
            tracing::warn!("index recovery failed for {}: {:#}", index_path.display(), e);
        }
    }
}
