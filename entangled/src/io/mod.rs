//! All file IO in Entangled passes through a transaction.

mod file_cache;
mod filedb;
mod stat;
mod transaction;

pub use file_cache::{FileCache, RealFileCache, VirtualFS};
pub use filedb::{DbLock, FileDB, FILEDB_LOCK_PATH, FILEDB_PATH};
pub use stat::{hexdigest, Stat};
pub use transaction::{CommitReport, Transaction, TransactionMode};
