//! Index corruption recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Repairs a corrupted index document.
///
/// The registry only guarantees that the handler runs when corruption is
/// detected; what "repair" means is up to the host.
pub trait CorruptionHandler {
    fn recover(&self, index_path: &Path) -> Result<()>;
}

impl<F> CorruptionHandler for F
where
    F: Fn(&Path) -> Result<()>,
{
    fn recover(&self, index_path: &Path) -> Result<()> {
        self(index_path)
    }
}

/// Moves a corrupted index aside so the next reconciliation starts fresh.
///
/// The document is renamed to `<index>.corrupt`, replacing any earlier
/// quarantined copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct Quarantine;

impl CorruptionHandler for Quarantine {
    fn recover(&self, index_path: &Path) -> Result<()> {
        if !index_path.exists() {
            return Ok(());
        }

        let target = quarantine_path(index_path);
        std::fs::rename(index_path, &target).with_context(|| {
            format!(
                "failed to quarantine {} to {}",
                index_path.display(),
                target.display()
            )
        })?;

        tracing::warn!(
            "moved corrupted index {} to {}",
            index_path.display(),
            target.display()
        );
        Ok(())
    }
}

/// Where [`Quarantine`] moves a corrupted index.
pub fn quarantine_path(index_path: &Path) -> PathBuf {
    let mut path = index_path.as_os_str().to_owned();
    path.push(".corrupt");
    PathBuf::from(path)
}
