//! Stitch command implementation.

use entangled::errors::Result;
use entangled::interface::{self, Context};
use entangled::io::TransactionMode;

use super::helpers::print_report;

/// Pushes edits made to tangled files back into the markdown sources.
pub fn stitch(ctx: &Context, mode: TransactionMode) -> Result<()> {
    tracing::info!("stitching documents");
    let report = interface::stitch(ctx, mode)?;
    print_report(&report, mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use entangled::io::{FileCache, VirtualFS};
    use entangled::Config;
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn test_stitch_after_edit() {
        let vfs = VirtualFS::new();
        vfs.add_file(
            "test.md",
            "```{.python file=out.py}\n<<body>>\n```\n\n```{.python #body}\nold\n```\n",
        );
        let ctx = Context::new(Arc::new(vfs.clone()), Config::default());

        super::super::tangle(&ctx, TransactionMode::Fail).unwrap();
        let tangled = vfs.read(Path::new("out.py")).unwrap();
        vfs.add_file("out.py", tangled.replace("old", "new"));

        stitch(&ctx, TransactionMode::Fail).unwrap();
        assert!(vfs.read(Path::new("test.md")).unwrap().contains("new\n"));
    }
}
