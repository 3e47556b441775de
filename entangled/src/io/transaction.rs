//! Transactional file synchronization.
//!
//! A transaction stages writes and deletes, classifies every staged
//! action against the database under the advisory lock, and only then
//! flushes to the filesystem. Aborting (or dropping) a transaction
//! leaves both the filesystem and the database untouched.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::file_cache::FileCache;
use super::filedb::{DbLock, FileDB};
use super::stat::hexdigest;
use crate::errors::{EntangledError, Result};

/// Policy governing how staged actions meet on-disk state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Abort on any out-of-band edit.
    Fail,
    /// Overwrite out-of-band edits.
    Force,
    /// Dry run: report actions, no I/O, database not persisted.
    Show,
    /// Rebuild the database from on-disk state, no file I/O.
    ResetDb,
}

#[derive(Debug)]
enum Action {
    Write {
        path: PathBuf,
        content: String,
        make_target: bool,
    },
    Delete {
        path: PathBuf,
    },
}

impl Action {
    fn describe(&self) -> String {
        match self {
            Action::Write { path, .. } => format!("write {}", path.display()),
            Action::Delete { path } => format!("delete {}", path.display()),
        }
    }
}

/// What classification decided for one staged action.
#[derive(Debug)]
enum Planned {
    Write {
        path: PathBuf,
        content: String,
        make_target: bool,
    },
    Delete {
        path: PathBuf,
    },
    Skip {
        path: PathBuf,
    },
    RecordOnly {
        path: PathBuf,
        make_target: bool,
    },
    RemoveOnly {
        path: PathBuf,
    },
}

/// Outcome of a committed transaction.
#[derive(Debug, Clone, Default)]
pub struct CommitReport {
    /// Paths written (or that would be written under `Show`).
    pub written: Vec<PathBuf>,
    /// Paths deleted (or that would be deleted under `Show`).
    pub deleted: Vec<PathBuf>,
    /// Paths whose staged content already matched the recorded state.
    pub skipped: Vec<PathBuf>,
}

/// A batch of staged filesystem mutations.
///
/// Opening a transaction acquires the database lock and reads the
/// database snapshot; the lock is released when the transaction is
/// committed or dropped.
#[derive(Debug)]
pub struct Transaction {
    mode: TransactionMode,
    fs: Arc<dyn FileCache>,
    db: FileDB,
    _lock: DbLock,
    actions: Vec<Action>,
}

impl Transaction {
    /// Opens a transaction: takes the lock, reads the database.
    ///
    /// `ResetDb` starts from a fresh database instead of reading the
    /// stale one, so `reset` also recovers from version mismatches.
    pub fn open(fs: Arc<dyn FileCache>, mode: TransactionMode) -> Result<Self> {
        let lock = DbLock::acquire(&*fs)?;
        let db = match mode {
            TransactionMode::ResetDb => FileDB::new(),
            _ => FileDB::read(&*fs)?,
        };
        Ok(Self {
            mode,
            fs,
            db,
            _lock: lock,
            actions: Vec::new(),
        })
    }

    /// The database snapshot this transaction operates on.
    pub fn db(&self) -> &FileDB {
        &self.db
    }

    /// Records the current stat of a file in the database.
    ///
    /// Called for every markdown file as it is loaded, and for every
    /// target whose edits the stitcher has absorbed; a recorded file
    /// classifies as in-sync rather than unknown or conflicting.
    pub fn record_stat(&mut self, path: &Path) -> Result<()> {
        self.db.update(&*self.fs, path)
    }

    /// Stages a write to a (markdown) file.
    pub fn write(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.actions.push(Action::Write {
            path: path.into(),
            content: content.into(),
            make_target: false,
        });
    }

    /// Stages a write that creates or refreshes a tangled target.
    pub fn create_target(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.actions.push(Action::Write {
            path: path.into(),
            content: content.into(),
            make_target: true,
        });
    }

    /// Stages deletion of a file.
    pub fn delete(&mut self, path: impl Into<PathBuf>) {
        self.actions.push(Action::Delete { path: path.into() });
    }

    /// Stages deletion of every managed file this transaction did not
    /// tangle: targets of a previous cycle no longer produced.
    pub fn clear_orphans(&mut self) {
        let produced: HashSet<PathBuf> = self
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::Write {
                    path,
                    make_target: true,
                    ..
                } => Some(path.clone()),
                _ => None,
            })
            .collect();

        for path in self.db.managed_files() {
            if !produced.contains(&path) {
                tracing::info!("orphan `{}`", path.display());
                self.actions.push(Action::Delete { path });
            }
        }
    }

    /// Returns the number of staged actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns descriptions of all staged actions.
    pub fn describe(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.describe()).collect()
    }

    /// Classifies all staged actions, then flushes.
    ///
    /// Classification runs to completion before the first byte reaches
    /// the filesystem; a conflict under `Fail` aborts with nothing
    /// mutated.
    pub fn commit(mut self) -> Result<CommitReport> {
        let actions = std::mem::take(&mut self.actions);
        let mut plans = Vec::with_capacity(actions.len());
        for action in &actions {
            plans.push(self.classify(action)?);
        }

        let mut report = CommitReport::default();
        let dry_run = self.mode == TransactionMode::Show;

        for plan in plans {
            match plan {
                Planned::Write {
                    path,
                    content,
                    make_target,
                } => {
                    if dry_run {
                        tracing::info!("would write `{}`", path.display());
                    } else {
                        self.fs.write(&path, &content)?;
                        if make_target {
                            self.db.create_target(&*self.fs, &path)?;
                        } else {
                            self.db.update(&*self.fs, &path)?;
                        }
                    }
                    report.written.push(path);
                }
                Planned::Delete { path } => {
                    if dry_run {
                        tracing::info!("would delete `{}`", path.display());
                    } else {
                        self.fs.delete(&path)?;
                        self.db.remove(&path);
                    }
                    report.deleted.push(path);
                }
                Planned::Skip { path } => {
                    tracing::debug!("`{}` unchanged", path.display());
                    report.skipped.push(path);
                }
                Planned::RecordOnly { path, make_target } => {
                    if make_target {
                        self.db.create_target(&*self.fs, &path)?;
                    } else {
                        self.db.update(&*self.fs, &path)?;
                    }
                    report.skipped.push(path);
                }
                Planned::RemoveOnly { path } => {
                    self.db.remove(&path);
                    report.skipped.push(path);
                }
            }
        }

        if !dry_run {
            self.db.write(&*self.fs)?;
        }
        Ok(report)
    }

    /// Decides what to do for one action, per the mode policy.
    fn classify(&self, action: &Action) -> Result<Planned> {
        match action {
            Action::Write {
                path,
                content,
                make_target,
            } => self.classify_write(path, content, *make_target),
            Action::Delete { path } => self.classify_delete(path),
        }
    }

    fn classify_write(&self, path: &Path, content: &str, make_target: bool) -> Result<Planned> {
        if self.mode == TransactionMode::ResetDb {
            return Ok(Planned::RecordOnly {
                path: path.to_path_buf(),
                make_target,
            });
        }

        if !self.fs.exists(path) {
            return Ok(Planned::Write {
                path: path.to_path_buf(),
                content: content.to_string(),
                make_target,
            });
        }

        let on_disk = self.fs.stat(path)?;

        match self.db.get(path) {
            Some(recorded) => {
                if recorded.hexdigest == on_disk.hexdigest {
                    if hexdigest(content) == on_disk.hexdigest {
                        Ok(Planned::Skip {
                            path: path.to_path_buf(),
                        })
                    } else {
                        Ok(Planned::Write {
                            path: path.to_path_buf(),
                            content: content.to_string(),
                            make_target,
                        })
                    }
                } else {
                    // Out-of-band edit
                    match self.mode {
                        TransactionMode::Fail => Err(EntangledError::Conflict {
                            path: path.to_path_buf(),
                        }),
                        TransactionMode::Force => Ok(Planned::Write {
                            path: path.to_path_buf(),
                            content: content.to_string(),
                            make_target,
                        }),
                        TransactionMode::Show => {
                            tracing::warn!(
                                "`{}` was modified out of band; tangle would conflict",
                                path.display()
                            );
                            Ok(Planned::Write {
                                path: path.to_path_buf(),
                                content: content.to_string(),
                                make_target,
                            })
                        }
                        TransactionMode::ResetDb => unreachable!(),
                    }
                }
            }
            None => {
                // Existing file the database knows nothing about
                match self.mode {
                    TransactionMode::Fail => Err(EntangledError::Conflict {
                        path: path.to_path_buf(),
                    }),
                    TransactionMode::Force | TransactionMode::Show => Ok(Planned::Write {
                        path: path.to_path_buf(),
                        content: content.to_string(),
                        make_target,
                    }),
                    TransactionMode::ResetDb => unreachable!(),
                }
            }
        }
    }

    fn classify_delete(&self, path: &Path) -> Result<Planned> {
        if self.mode == TransactionMode::ResetDb {
            return Ok(Planned::RemoveOnly {
                path: path.to_path_buf(),
            });
        }

        if !self.fs.exists(path) {
            return Ok(Planned::RemoveOnly {
                path: path.to_path_buf(),
            });
        }

        let on_disk = self.fs.stat(path)?;
        let clean = self
            .db
            .get(path)
            .map(|recorded| recorded.hexdigest == on_disk.hexdigest)
            .unwrap_or(false);

        if clean {
            return Ok(Planned::Delete {
                path: path.to_path_buf(),
            });
        }

        match self.mode {
            TransactionMode::Fail => Err(EntangledError::Conflict {
                path: path.to_path_buf(),
            }),
            TransactionMode::Force => Ok(Planned::Delete {
                path: path.to_path_buf(),
            }),
            TransactionMode::Show => {
                tracing::warn!(
                    "`{}` was modified out of band; deletion would conflict",
                    path.display()
                );
                Ok(Planned::Delete {
                    path: path.to_path_buf(),
                })
            }
            TransactionMode::ResetDb => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::VirtualFS;

    fn open(fs: &VirtualFS, mode: TransactionMode) -> Transaction {
        Transaction::open(Arc::new(fs.clone()), mode).unwrap()
    }

    #[test]
    fn test_write_new_path() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "code\n");

        let report = tx.commit().unwrap();
        assert_eq!(report.written, vec![PathBuf::from("out.py")]);
        assert_eq!(fs.read(Path::new("out.py")).unwrap(), "code\n");

        let db = FileDB::read(&fs).unwrap();
        assert!(db.is_target(Path::new("out.py")));
        assert!(db.check(Path::new("out.py"), "code\n"));
    }

    #[test]
    fn test_second_identical_write_skipped() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "code\n");
        tx.commit().unwrap();

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "code\n");
        let report = tx.commit().unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.skipped, vec![PathBuf::from("out.py")]);
    }

    #[test]
    fn test_changed_content_rewrites_clean_target() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "v1\n");
        tx.commit().unwrap();

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "v2\n");
        let report = tx.commit().unwrap();

        assert_eq!(report.written, vec![PathBuf::from("out.py")]);
        assert_eq!(fs.read(Path::new("out.py")).unwrap(), "v2\n");
    }

    #[test]
    fn test_out_of_band_edit_conflicts_under_fail() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "original\n");
        tx.commit().unwrap();

        fs.add_file("out.py", "edited by hand\n");

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "original\n");
        let err = tx.commit().unwrap_err();
        assert!(matches!(err, EntangledError::Conflict { .. }));

        // Nothing mutated
        assert_eq!(fs.read(Path::new("out.py")).unwrap(), "edited by hand\n");
        let db = FileDB::read(&fs).unwrap();
        assert!(db.check(Path::new("out.py"), "original\n"));
    }

    #[test]
    fn test_out_of_band_edit_overwritten_under_force() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "original\n");
        tx.commit().unwrap();

        fs.add_file("out.py", "edited by hand\n");

        let mut tx = open(&fs, TransactionMode::Force);
        tx.create_target("out.py", "original\n");
        let report = tx.commit().unwrap();

        assert_eq!(report.written, vec![PathBuf::from("out.py")]);
        assert_eq!(fs.read(Path::new("out.py")).unwrap(), "original\n");
        let db = FileDB::read(&fs).unwrap();
        assert!(db.check(Path::new("out.py"), "original\n"));
    }

    #[test]
    fn test_unknown_existing_file_conflicts_under_fail() {
        let fs = VirtualFS::new();
        fs.add_file("out.py", "some pre-existing file\n");

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "tangled\n");
        let err = tx.commit().unwrap_err();
        assert!(matches!(err, EntangledError::Conflict { .. }));
    }

    #[test]
    fn test_unknown_existing_file_adopted_under_force() {
        let fs = VirtualFS::new();
        fs.add_file("out.py", "some pre-existing file\n");

        let mut tx = open(&fs, TransactionMode::Force);
        tx.create_target("out.py", "tangled\n");
        tx.commit().unwrap();

        let db = FileDB::read(&fs).unwrap();
        assert!(db.is_target(Path::new("out.py")));
        assert_eq!(fs.read(Path::new("out.py")).unwrap(), "tangled\n");
    }

    #[test]
    fn test_show_mode_performs_no_io() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Show);
        tx.create_target("out.py", "code\n");
        let report = tx.commit().unwrap();

        assert_eq!(report.written, vec![PathBuf::from("out.py")]);
        assert!(!fs.exists(Path::new("out.py")));
        assert!(!fs.exists(Path::new(super::super::filedb::FILEDB_PATH)));
    }

    #[test]
    fn test_resetdb_records_disk_state_without_io() {
        let fs = VirtualFS::new();
        fs.add_file("out.py", "on disk\n");

        let mut tx = open(&fs, TransactionMode::ResetDb);
        tx.create_target("out.py", "would-be content\n");
        tx.create_target("absent.py", "never written\n");
        tx.commit().unwrap();

        assert_eq!(fs.read(Path::new("out.py")).unwrap(), "on disk\n");
        assert!(!fs.exists(Path::new("absent.py")));

        let db = FileDB::read(&fs).unwrap();
        // Recorded as it is on disk, so a later tangle may overwrite it
        assert!(db.check(Path::new("out.py"), "on disk\n"));
        // Absent files stay unrecorded
        assert!(!db.contains(Path::new("absent.py")));
    }

    #[test]
    fn test_clear_orphans_deletes_unproduced_targets() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("keep.py", "keep\n");
        tx.create_target("orphan.py", "orphan\n");
        tx.commit().unwrap();

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("keep.py", "keep\n");
        tx.clear_orphans();
        let report = tx.commit().unwrap();

        assert_eq!(report.deleted, vec![PathBuf::from("orphan.py")]);
        assert!(!fs.exists(Path::new("orphan.py")));
        let db = FileDB::read(&fs).unwrap();
        assert!(!db.contains(Path::new("orphan.py")));
        assert!(db.contains(Path::new("keep.py")));
    }

    #[test]
    fn test_delete_of_edited_file_conflicts_under_fail() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("orphan.py", "generated\n");
        tx.commit().unwrap();

        fs.add_file("orphan.py", "precious manual edits\n");

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.clear_orphans();
        let err = tx.commit().unwrap_err();
        assert!(matches!(err, EntangledError::Conflict { .. }));
        assert!(fs.exists(Path::new("orphan.py")));
    }

    #[test]
    fn test_dropped_transaction_mutates_nothing() {
        let fs = VirtualFS::new();
        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("out.py", "code\n");
        drop(tx);

        assert!(!fs.exists(Path::new("out.py")));
        assert!(!fs.exists(Path::new(super::super::filedb::FILEDB_PATH)));
    }

    #[test]
    fn test_conflict_anywhere_aborts_everything() {
        let fs = VirtualFS::new();
        fs.add_file("existing.py", "unknown to db\n");

        let mut tx = open(&fs, TransactionMode::Fail);
        tx.create_target("fresh.py", "fine\n");
        tx.create_target("existing.py", "conflicts\n");
        assert!(tx.commit().is_err());

        // The clean write was not flushed either
        assert!(!fs.exists(Path::new("fresh.py")));
    }
}
