//! Shebang hook: tangled scripts become executable.

use super::Hook;
use crate::errors::Result;
use crate::io::FileCache;
use crate::model::ReferenceMap;

/// Marks every tangled target whose init block starts with `#!` as
/// executable.
pub struct ShebangHook;

impl Hook for ShebangHook {
    fn name(&self) -> &'static str {
        "shebang"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn post_tangle(&self, refs: &ReferenceMap, fs: &dyn FileCache) -> Result<()> {
        for (target, id) in refs.targets() {
            let Some(init) = refs.get(id) else { continue };
            if init.source.starts_with("#!") && fs.exists(target) {
                tracing::debug!("marking `{}` executable", target.display());
                fs.make_executable(target)?;
            }
        }
        Ok(())
    }
}
