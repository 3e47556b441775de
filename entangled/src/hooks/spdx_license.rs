//! SPDX license hook.

use super::Hook;
use crate::errors::Result;
use crate::io::FileCache;
use crate::model::ReferenceMap;

const SPDX_TAG: &str = "SPDX-License-Identifier:";

/// Reports tangled targets that carry no SPDX license identifier.
pub struct SpdxLicenseHook;

impl Hook for SpdxLicenseHook {
    fn name(&self) -> &'static str {
        "spdx_license"
    }

    fn post_tangle(&self, refs: &ReferenceMap, fs: &dyn FileCache) -> Result<()> {
        for (target, _) in refs.targets() {
            if !fs.exists(target) {
                continue;
            }
            let content = fs.read(target)?;
            if !content.contains(SPDX_TAG) {
                tracing::warn!(
                    "`{}` carries no `{}` tag",
                    target.display(),
                    SPDX_TAG
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::VirtualFS;
    use crate::test_utils::make_block_with_target;

    #[test]
    fn test_runs_over_targets() {
        let fs = VirtualFS::new();
        fs.add_file("a.py", "# SPDX-License-Identifier: MIT\ncode\n");
        fs.add_file("b.py", "code\n");

        let mut refs = ReferenceMap::new();
        refs.insert(make_block_with_target("a", "code\n", "a.py"))
            .unwrap();
        refs.insert(make_block_with_target("b", "code\n", "b.py"))
            .unwrap();

        SpdxLicenseHook.post_tangle(&refs, &fs).unwrap();
    }
}
