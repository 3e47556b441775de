//! Reset command implementation.
//!
//! The file database gets updated on every tangle or stitch, but its
//! contents may become invalid, for instance when switching branches.
//! Resetting performs a tangle without touching any file, recording the
//! on-disk state as the new baseline.

use entangled::errors::Result;
use entangled::interface::{self, Context};
use entangled::io::TransactionMode;

/// Rebuilds the file database from the markdown sources and disk state.
pub fn reset(ctx: &Context) -> Result<()> {
    tracing::info!("resetting file database");
    interface::tangle(ctx, TransactionMode::ResetDb)?;
    println!("file database reset");
    Ok(())
}
