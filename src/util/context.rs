//! Global context for Berth operations.
//!
//! Provides centralized access to configuration, paths, and environment.
//! Every path the context hands out is resolved against the working
//! directory, so commands never deal with relative paths themselves.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Default location of the index document inside a project.
pub const DEFAULT_INDEX_PATH: &str = ".berth/index.json";

/// Default source file extension.
pub const DEFAULT_EXTENSION: &str = "toml";

/// Namespace used when the root directory has no usable name.
const FALLBACK_NAMESPACE: &str = "resources";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&cwd));
        GlobalContext {
            cwd,
            config,
        }
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve the index path: explicit flag, then config, then default.
    pub fn index_path(&self, flag: Option<&Path>) -> PathBuf {
        let path = flag
            .map(Path::to_path_buf)
            .or_else(|| self.config.index.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_PATH));
        self.cwd.join(path)
    }

    /// Resolve the source root: explicit flag, then config, then cwd.
    pub fn source_root(&self, flag: Option<&Path>) -> PathBuf {
        match flag.map(Path::to_path_buf).or_else(|| self.config.sources.root.clone()) {
            Some(root) => self.cwd.join(root),
            None => self.cwd.clone(),
        }
    }

    /// Resolve the namespace: explicit flag, then config, then the root's
    /// directory name.
    pub fn namespace(&self, flag: Option<&str>, root: &Path) -> String {
        if let Some(namespace) = flag.or(self.config.sources.namespace.as_deref()) {
            return namespace.to_string();
        }
        crate::util::fs::normalize_path(root)
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string())
    }

    /// Resolve external roots: flags replace config when given.
    pub fn external_roots(&self, flags: &[PathBuf]) -> Vec<PathBuf> {
        let roots = if flags.is_empty() {
            &self.config.sources.external
        } else {
            flags
        };
        roots.iter().map(|root| self.cwd.join(root)).collect()
    }

    /// Resolve exclusions: flags replace config when given.
    pub fn exclude(&self, flags: &[String]) -> Vec<String> {
        if flags.is_empty() {
            self.config.sources.exclude.clone()
        } else {
            flags.to_vec()
        }
    }

    /// Source file extensions from config, or the default.
    pub fn extensions(&self) -> Vec<String> {
        if self.config.sources.extensions.is_empty() {
            vec![DEFAULT_EXTENSION.to_string()]
        } else {
            self.config.sources.extensions.clone()
        }
    }
}
