//! Status command implementation.

use entangled::errors::Result;
use entangled::interface::Context;
use entangled::io::{Transaction, TransactionMode};

/// Lists tracked files and any out-of-band changes.
pub fn status(ctx: &Context) -> Result<()> {
    // Opening a transaction takes the lock and reads the database;
    // dropping it without commit leaves everything untouched.
    let tx = Transaction::open(ctx.fs.clone(), TransactionMode::Fail)?;
    let db = tx.db();

    if db.files.is_empty() {
        println!("no tracked files (run `entangled tangle` first)");
        return Ok(());
    }

    for (path, _) in db.files.iter() {
        let role = if db.targets.contains(path) {
            "target"
        } else {
            "source"
        };
        println!("{:<8} {}", role, path);
    }

    let changed: Vec<_> = db.changed_files(&*ctx.fs).collect();
    if changed.is_empty() {
        println!("\nall files in sync");
    } else {
        println!("\nchanged since last sync:");
        for path in changed {
            println!("  {}", path.display());
        }
    }

    Ok(())
}
