//! Hooks post-process the reference map after tangling.
//!
//! Hooks are named in the `hooks` configuration list and resolved
//! against a static registry. They run after the transaction commits,
//! ordered by priority.

mod shebang;
mod spdx_license;

pub use shebang::ShebangHook;
pub use spdx_license::SpdxLicenseHook;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::errors::Result;
use crate::io::FileCache;
use crate::model::ReferenceMap;

/// A post-tangle processor.
pub trait Hook: Send + Sync {
    /// Registry name of this hook.
    fn name(&self) -> &'static str;

    /// Hooks run in ascending priority order.
    fn priority(&self) -> i32 {
        0
    }

    /// Runs after a tangle transaction has committed.
    fn post_tangle(&self, refs: &ReferenceMap, fs: &dyn FileCache) -> Result<()>;
}

type HookFactory = fn() -> Box<dyn Hook>;

/// Static registry of available hooks, keyed by configuration name.
static REGISTRY: Lazy<HashMap<&'static str, HookFactory>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, HookFactory> = HashMap::new();
    map.insert("shebang", || Box::new(ShebangHook));
    map.insert("spdx_license", || Box::new(SpdxLicenseHook));
    map
});

/// Instantiates a hook by name.
pub fn create_hook(name: &str) -> Option<Box<dyn Hook>> {
    REGISTRY.get(name).map(|factory| factory())
}

/// Instantiates the configured hooks, sorted by priority.
///
/// Unknown names are reported and skipped.
pub fn create_hooks(names: &[String]) -> Vec<Box<dyn Hook>> {
    let mut hooks = Vec::new();
    for name in names {
        match create_hook(name) {
            Some(hook) => hooks.push(hook),
            None => tracing::warn!("unknown hook `{}` in configuration", name),
        }
    }
    hooks.sort_by_key(|h| h.priority());
    hooks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert!(create_hook("shebang").is_some());
        assert!(create_hook("spdx_license").is_some());
        assert!(create_hook("nonexistent").is_none());
    }

    #[test]
    fn test_create_hooks_sorted_by_priority() {
        let hooks = create_hooks(&[
            "shebang".to_string(),
            "spdx_license".to_string(),
            "bogus".to_string(),
        ]);
        assert_eq!(hooks.len(), 2);
        for pair in hooks.windows(2) {
            assert!(pair[0].priority() <= pair[1].priority());
        }
    }
}
