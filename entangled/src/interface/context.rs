//! Execution context for Entangled operations.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{get_input_files, read_config, Config};
use crate::errors::Result;
use crate::hooks::{create_hooks, Hook};
use crate::io::{FileCache, RealFileCache};

/// Everything an operation needs: the filesystem, the project
/// configuration and the instantiated hooks.
///
/// The file database is deliberately absent; it belongs to the
/// transaction, which reads it under the lock.
pub struct Context {
    /// File system access.
    pub fs: Arc<dyn FileCache>,
    /// Project configuration.
    pub config: Config,
    /// Hooks named by the configuration, sorted by priority.
    pub hooks: Vec<Box<dyn Hook>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.hooks.iter().map(|h| h.name()).collect();
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("hooks", &names)
            .finish()
    }
}

impl Context {
    /// Creates a context over a filesystem with a given configuration.
    pub fn new(fs: Arc<dyn FileCache>, config: Config) -> Self {
        let hooks = create_hooks(&config.hooks);
        Self { fs, config, hooks }
    }

    /// Creates a context for the current directory, reading the project
    /// configuration if present.
    pub fn from_current_dir() -> Result<Self> {
        let fs: Arc<dyn FileCache> = Arc::new(RealFileCache::current_dir()?);
        let config = match read_config(&*fs)? {
            Some(update) => update.merge(&Config::default()),
            None => Config::default(),
        };
        Ok(Self::new(fs, config))
    }

    /// Returns the sorted list of input markdown files.
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        get_input_files(&*self.fs, &self.config)
    }
}
