//! Tangle command implementation.

use entangled::errors::Result;
use entangled::interface::{self, Context};
use entangled::io::TransactionMode;

use super::helpers::print_report;

/// Extracts code from the markdown sources into target files.
pub fn tangle(ctx: &Context, mode: TransactionMode) -> Result<()> {
    tracing::info!("tangling documents");
    let report = interface::tangle(ctx, mode)?;
    print_report(&report, mode);
    Ok(())
}
