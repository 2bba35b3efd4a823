//! The loader seam.

use std::path::Path;

use anyhow::Result;

use crate::core::registry::Registry;

/// Executes a source file so that the registrations it declares run.
///
/// Callers set the current source on the registry before calling
/// `execute`, so implementations only need to register what the file
/// declares. Executing the same file twice must be safe.
pub trait Loader<R> {
    fn execute(&mut self, path: &Path, source_name: &str, registry: &mut Registry<R>)
        -> Result<()>;
}

impl<R, F> Loader<R> for F
where
    F: FnMut(&Path, &str, &mut Registry<R>) -> Result<()>,
{
    fn execute(
        &mut self,
        path: &Path,
        source_name: &str,
        registry: &mut Registry<R>,
    ) -> Result<()> {
        self(path, source_name, registry)
    }
}
