//! Persistent database of file states.
//!
//! Stores the stat of every markdown source and tangled target so
//! out-of-band edits, conflicts and orphans can be detected. The file is
//! JSON with sorted keys and lives under `.entangled/`, which is
//! typically kept in version control.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::file_cache::FileCache;
use super::stat::{hexdigest, Stat};
use crate::errors::{EntangledError, Result};

/// Location of the serialized database.
pub const FILEDB_PATH: &str = ".entangled/filedb.json";
/// Empty file used for advisory locking across processes.
pub const FILEDB_LOCK_PATH: &str = ".entangled/filedb.lock";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database of known files and their recorded stats.
///
/// All files live in one map; `targets` marks the subset that was
/// generated by tangling and may therefore be regenerated or deleted.
/// Markdown sources appear in `files` but never in `targets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDB {
    /// Tool version that wrote the database.
    pub version: String,

    /// Recorded stat per path (slash-separated, relative).
    #[serde(default)]
    pub files: BTreeMap<String, Stat>,

    /// Paths generated by tangling.
    #[serde(default)]
    pub targets: BTreeSet<String>,
}

impl Default for FileDB {
    fn default() -> Self {
        Self::new()
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl FileDB {
    /// Creates an empty database for the current tool version.
    pub fn new() -> Self {
        Self {
            version: VERSION.to_string(),
            files: BTreeMap::new(),
            targets: BTreeSet::new(),
        }
    }

    /// Checks if a path is recorded.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(&path_key(path))
    }

    /// Returns the recorded stat for a path.
    pub fn get(&self, path: &Path) -> Option<&Stat> {
        self.files.get(&path_key(path))
    }

    /// Checks if a path is a tangled target.
    pub fn is_target(&self, path: &Path) -> bool {
        self.targets.contains(&path_key(path))
    }

    /// Re-reads a file's stat from the filesystem and records it.
    ///
    /// A path missing from the filesystem is not recorded.
    pub fn update(&mut self, fs: &dyn FileCache, path: &Path) -> Result<()> {
        if fs.exists(path) {
            let stat = fs.stat(path)?;
            self.files.insert(path_key(path), stat);
        }
        Ok(())
    }

    /// Records a file as a tangled target.
    pub fn create_target(&mut self, fs: &dyn FileCache, path: &Path) -> Result<()> {
        self.update(fs, path)?;
        if self.contains(path) {
            self.targets.insert(path_key(path));
        }
        Ok(())
    }

    /// Removes a path from the database.
    pub fn remove(&mut self, path: &Path) {
        let key = path_key(path);
        self.targets.remove(&key);
        self.files.remove(&key);
    }

    /// Paths whose on-disk stat disagrees with the recorded one.
    ///
    /// Missing files count as changed.
    pub fn changed_files<'a>(
        &'a self,
        fs: &'a dyn FileCache,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        self.files.iter().filter_map(move |(key, known)| {
            let path = PathBuf::from(key);
            match fs.stat(&path) {
                Ok(stat) if &stat == known => None,
                _ => Some(path),
            }
        })
    }

    /// All files reconstructible from the sources, i.e. the targets.
    pub fn managed_files(&self) -> BTreeSet<PathBuf> {
        self.targets.iter().map(PathBuf::from).collect()
    }

    /// Checks content against the recorded digest.
    pub fn check(&self, path: &Path, content: &str) -> bool {
        match self.get(path) {
            Some(stat) => hexdigest(content) == stat.hexdigest,
            None => false,
        }
    }

    /// Loads the database, or an empty one when none exists.
    ///
    /// A database written by a different tool version is a user error
    /// with a remediation hint; entries missing on disk are reported as
    /// undead and kept.
    pub fn read(fs: &dyn FileCache) -> Result<Self> {
        let path = Path::new(FILEDB_PATH);
        if !fs.exists(path) {
            return Ok(Self::new());
        }

        tracing::debug!("reading file database");
        let content = fs.read(path)?;
        let db: FileDB = serde_json::from_str(&content)?;

        if db.version != VERSION {
            return Err(EntangledError::helpful(
                format!(
                    "File database was created with a different version of Entangled ({}).",
                    db.version
                ),
                format!(
                    "Run `entangled reset` to regenerate the database to version {}.",
                    VERSION
                ),
            ));
        }

        for key in db.files.keys() {
            if !fs.exists(Path::new(key)) {
                tracing::warn!("undead file `{}` (found in db but not on drive)", key);
            }
        }

        Ok(db)
    }

    /// Serializes the database with sorted fields.
    pub fn write(&self, fs: &dyn FileCache) -> Result<()> {
        tracing::debug!("writing file database");
        let content = serde_json::to_string_pretty(self)?;
        fs.write(Path::new(FILEDB_PATH), &content)?;
        Ok(())
    }
}

/// Advisory lock over the database file, held for a transaction's
/// lifetime.
///
/// Acquisition blocks until the lock is free. In-memory filesystems
/// yield no lock file and the guard is a no-op.
#[derive(Debug)]
pub struct DbLock {
    file: Option<File>,
}

impl DbLock {
    /// Acquires the lock, blocking.
    pub fn acquire(fs: &dyn FileCache) -> Result<Self> {
        let file = fs.open_lock(Path::new(FILEDB_LOCK_PATH))?;
        if let Some(ref f) = file {
            f.lock_exclusive()?;
        }
        Ok(Self { file })
    }
}

impl Drop for DbLock {
    fn drop(&mut self) {
        if let Some(ref f) = self.file {
            let _ = f.unlock();
        }
    }
}
