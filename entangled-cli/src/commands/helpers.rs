//! Shared output helpers for commands.

use entangled::io::{CommitReport, TransactionMode};

/// Prints what a committed transaction did (or would do, under `Show`).
pub fn print_report(report: &CommitReport, mode: TransactionMode) {
    let prefix = if mode == TransactionMode::Show {
        "would "
    } else {
        ""
    };

    for path in &report.written {
        println!("{}write {}", prefix, path.display());
    }
    for path in &report.deleted {
        println!("{}delete {}", prefix, path.display());
    }

    if report.written.is_empty() && report.deleted.is_empty() {
        println!("everything up to date");
    }
}
