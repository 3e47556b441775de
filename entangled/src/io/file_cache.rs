//! File system abstraction.
//!
//! All engine I/O goes through a [`FileCache`]: the real filesystem in
//! production, an in-memory map in tests. Transactions flush through the
//! same interface, which is what makes the whole pipeline testable
//! without touching disk.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::stat::Stat;

/// Uniform file access for the engine.
pub trait FileCache: Send + Sync + std::fmt::Debug {
    /// Reads the contents of a file.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Writes a file, creating parent directories as needed.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Deletes a file; deleting a missing file is not an error.
    fn delete(&self, path: &Path) -> io::Result<()>;

    /// Checks if a file exists.
    fn exists(&self, path: &Path) -> bool;

    /// Reads a file's stat, content digest included.
    fn stat(&self, path: &Path) -> io::Result<Stat>;

    /// Lists files matching a glob pattern.
    fn glob(&self, pattern: &str) -> io::Result<Vec<PathBuf>>;

    /// Marks a file as executable where the platform supports it.
    fn make_executable(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Opens the advisory lock file, or `None` when locking does not
    /// apply (in-memory filesystems).
    fn open_lock(&self, path: &Path) -> io::Result<Option<File>>;
}

/// Real file system, rooted at a base directory.
#[derive(Debug, Clone, Default)]
pub struct RealFileCache {
    /// Base directory for relative paths.
    pub base_dir: PathBuf,
}

impl RealFileCache {
    /// Creates a cache rooted at `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Creates a cache rooted at the current directory.
    pub fn current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Resolves a path relative to the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl FileCache for RealFileCache {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write(&full, content)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        let full = self.resolve(path);
        if full.exists() {
            fs::remove_file(full)?;
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        Stat::from_path(&self.resolve(path))
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<PathBuf>> {
        let full_pattern = self.base_dir.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let paths = glob::glob(&pattern_str)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .map(|p| {
                p.strip_prefix(&self.base_dir)
                    .map(|p| p.to_path_buf())
                    .unwrap_or(p)
            })
            .collect();

        Ok(paths)
    }

    #[cfg(unix)]
    fn make_executable(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let full = self.resolve(path);
        let mut perms = fs::metadata(&full)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(full, perms)
    }

    fn open_lock(&self, path: &Path) -> io::Result<Option<File>> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Some(File::create(full)?))
    }
}

/// Writes content via a temp file in the same directory, then renames.
fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_path = parent.join(format!(".entangled-tmp-{}", std::process::id()));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)
}

/// In-memory file system for tests.
///
/// Cloning shares the underlying storage, so a clone handed to a
/// transaction observes the same files as the test.
#[derive(Debug, Clone, Default)]
pub struct VirtualFS {
    files: Arc<Mutex<HashMap<PathBuf, VirtualFile>>>,
}

#[derive(Debug, Clone)]
struct VirtualFile {
    content: String,
    mtime: DateTime<Utc>,
}

impl VirtualFS {
    /// Creates an empty virtual file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a virtual file system pre-seeded with files.
    pub fn from_files(files: &[(&str, &str)]) -> Self {
        let fs = Self::new();
        for (path, content) in files {
            fs.add_file(*path, *content);
        }
        fs
    }

    /// Adds or replaces a file.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.lock().unwrap().insert(
            path.into(),
            VirtualFile {
                content: content.into(),
                mtime: Utc::now(),
            },
        );
    }

    /// Removes a file.
    pub fn remove_file(&self, path: &Path) {
        self.files.lock().unwrap().remove(path);
    }

    /// Lists all stored paths.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl FileCache for VirtualFS {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.add_file(path.to_path_buf(), content);
        Ok(())
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|f| Stat::from_content(&f.content, f.mtime))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<PathBuf>> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut matches: Vec<_> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|p| glob_pattern.matches_path(p))
            .cloned()
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn open_lock(&self, _path: &Path) -> io::Result<Option<File>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_fs_read_write() {
        let vfs = VirtualFS::new();
        vfs.add_file("test.txt", "hello world");

        assert!(vfs.exists(Path::new("test.txt")));
        assert!(!vfs.exists(Path::new("other.txt")));
        assert_eq!(vfs.read(Path::new("test.txt")).unwrap(), "hello world");

        vfs.write(Path::new("test.txt"), "updated").unwrap();
        assert_eq!(vfs.read(Path::new("test.txt")).unwrap(), "updated");
    }

    #[test]
    fn test_virtual_fs_shared_storage() {
        let vfs = VirtualFS::new();
        let clone = vfs.clone();
        clone.add_file("shared.txt", "content");
        assert!(vfs.exists(Path::new("shared.txt")));
    }

    #[test]
    fn test_virtual_fs_stat() {
        let vfs = VirtualFS::new();
        vfs.add_file("test.txt", "hello");

        let stat = vfs.stat(Path::new("test.txt")).unwrap();
        assert_eq!(stat.size, 5);
        assert_eq!(stat.hexdigest, super::super::stat::hexdigest("hello"));
    }

    #[test]
    fn test_virtual_fs_glob() {
        let vfs = VirtualFS::new();
        vfs.add_file("src/main.rs", "fn main() {}");
        vfs.add_file("src/lib.rs", "");
        vfs.add_file("README.md", "# Readme");

        assert_eq!(vfs.glob("src/*.rs").unwrap().len(), 2);
        assert_eq!(vfs.glob("*.md").unwrap().len(), 1);
        assert_eq!(vfs.glob("**/*.md").unwrap().len(), 1);
    }

    #[test]
    fn test_virtual_fs_lock_bypassed() {
        let vfs = VirtualFS::new();
        assert!(vfs.open_lock(Path::new(".entangled/filedb.lock")).unwrap().is_none());
    }

    #[test]
    fn test_real_file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RealFileCache::new(dir.path().to_path_buf());

        cache.write(Path::new("nested/test.txt"), "content").unwrap();
        assert!(cache.exists(Path::new("nested/test.txt")));
        assert_eq!(cache.read(Path::new("nested/test.txt")).unwrap(), "content");

        cache.delete(Path::new("nested/test.txt")).unwrap();
        assert!(!cache.exists(Path::new("nested/test.txt")));
        // Deleting again is fine
        cache.delete(Path::new("nested/test.txt")).unwrap();
    }

    #[test]
    fn test_real_file_cache_glob() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RealFileCache::new(dir.path().to_path_buf());

        cache.write(Path::new("a.md"), "a").unwrap();
        cache.write(Path::new("docs/b.md"), "b").unwrap();
        cache.write(Path::new("c.txt"), "c").unwrap();

        let md = cache.glob("**/*.md").unwrap();
        assert_eq!(md.len(), 2);
        assert!(md.contains(&PathBuf::from("a.md")));
        assert!(md.contains(&PathBuf::from("docs/b.md")));
    }
}
