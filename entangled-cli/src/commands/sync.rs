//! Sync command implementation.

use entangled::errors::Result;
use entangled::interface::{self, Context};
use entangled::io::TransactionMode;

use super::helpers::print_report;

/// Runs stitch then tangle in a single transaction.
pub fn sync(ctx: &Context, mode: TransactionMode) -> Result<()> {
    tracing::info!("synchronizing documents");
    let report = interface::sync(ctx, mode)?;
    print_report(&report, mode);
    Ok(())
}
