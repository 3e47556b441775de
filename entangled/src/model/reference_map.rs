//! Reference map with dual-index for code block lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use super::code_block::CodeBlock;
use super::reference_id::{Ordinal, ReferenceId};
use super::reference_name::ReferenceName;
use crate::errors::{EntangledError, Result};

/// A map of code blocks with dual-index lookup.
///
/// - Primary index: `IndexMap<ReferenceId, Arc<CodeBlock>>`; insertion
///   order equals source document order across all loaded documents.
/// - Name index: `HashMap<ReferenceName, Vec<ReferenceId>>`.
/// - Target registry: `IndexMap<PathBuf, ReferenceId>`, mapping each
///   declared output file to its init block.
///
/// Ordinals are assigned at insertion from a project-global counter per
/// name; an init block consumes a count but is labelled `init`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    blocks: IndexMap<ReferenceId, Arc<CodeBlock>>,
    name_index: HashMap<ReferenceName, Vec<ReferenceId>>,
    targets: IndexMap<PathBuf, ReferenceId>,
    counters: HashMap<ReferenceName, usize>,
}

impl ReferenceMap {
    /// Creates a new empty reference map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a code block, assigning its ordinal.
    ///
    /// Fails when the block declares a target that another block already
    /// seeds; the error carries the location of the offending block.
    pub fn insert(&mut self, mut block: CodeBlock) -> Result<ReferenceId> {
        let name = block.id.name.clone();
        let count = self.counters.entry(name.clone()).or_insert(0);
        let ordinal = if block.is_init() {
            Ordinal::Init
        } else {
            Ordinal::Count(*count)
        };
        *count += 1;

        block.id.ordinal = ordinal;
        let id = block.id.clone();

        if let Some(target) = block.target.clone() {
            if self.targets.contains_key(&target) {
                return Err(EntangledError::parse(
                    block.location.clone(),
                    format!("duplicate target file `{}`", target.display()),
                ));
            }
            self.targets.insert(target, id.clone());
        }

        self.name_index
            .entry(name)
            .or_default()
            .push(id.clone());
        self.blocks.insert(id.clone(), Arc::new(block));

        Ok(id)
    }

    /// Gets a code block by its ID.
    pub fn get(&self, id: &ReferenceId) -> Option<&CodeBlock> {
        self.blocks.get(id).map(|arc| arc.as_ref())
    }

    /// Gets all code blocks with the given name, in document order.
    pub fn get_by_name(&self, name: &ReferenceName) -> Vec<&CodeBlock> {
        self.name_index
            .get(name)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.blocks.get(id))
                    .map(|arc| arc.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks if any block carries the given name.
    pub fn contains_name(&self, name: &ReferenceName) -> bool {
        self.name_index.contains_key(name)
    }

    /// Replaces the source content of a block, keeping everything else.
    ///
    /// Returns false when the ID is unknown.
    pub fn set_content(&mut self, id: &ReferenceId, content: String) -> bool {
        match self.blocks.get_mut(id) {
            Some(slot) => {
                let mut block = (**slot).clone();
                block.source = content;
                *slot = Arc::new(block);
                true
            }
            None => false,
        }
    }

    /// Returns all declared target files with their init blocks.
    pub fn targets(&self) -> impl Iterator<Item = (&PathBuf, &ReferenceId)> {
        self.targets.iter()
    }

    /// Returns the init block for a target path.
    pub fn target_init(&self, path: &Path) -> Option<&CodeBlock> {
        self.targets.get(path).and_then(|id| self.get(id))
    }

    /// Returns all (ID, block) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ReferenceId, &CodeBlock)> {
        self.blocks.iter().map(|(id, arc)| (id, arc.as_ref()))
    }

    /// Returns the number of code blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if there are no code blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_block, make_block_with_target};

    #[test]
    fn test_insert_assigns_ordinals() {
        let mut map = ReferenceMap::new();
        let id1 = map.insert(make_block("main", "line1\n")).unwrap();
        let id2 = map.insert(make_block("main", "line2\n")).unwrap();
        let id3 = map.insert(make_block("main", "line3\n")).unwrap();

        assert_eq!(id1.ordinal, Ordinal::Count(0));
        assert_eq!(id2.ordinal, Ordinal::Count(1));
        assert_eq!(id3.ordinal, Ordinal::Count(2));

        let blocks = map.get_by_name(&ReferenceName::from_str("main"));
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn test_init_block_consumes_a_count() {
        let mut map = ReferenceMap::new();
        let id1 = map
            .insert(make_block_with_target("main", "seed\n", "out.py"))
            .unwrap();
        let id2 = map.insert(make_block("main", "more\n")).unwrap();

        assert_eq!(id1.ordinal, Ordinal::Init);
        assert_eq!(id2.ordinal, Ordinal::Count(1));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let mut map = ReferenceMap::new();
        map.insert(make_block_with_target("a", "x\n", "out.py"))
            .unwrap();
        let err = map
            .insert(make_block_with_target("b", "y\n", "out.py"))
            .unwrap_err();
        assert!(matches!(err, EntangledError::Parse { .. }));
    }

    #[test]
    fn test_targets() {
        let mut map = ReferenceMap::new();
        map.insert(make_block_with_target("main", "code\n", "output.py"))
            .unwrap();

        let targets: Vec<_> = map.targets().collect();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0, &PathBuf::from("output.py"));

        let init = map.target_init(Path::new("output.py")).unwrap();
        assert_eq!(init.source, "code\n");
    }

    #[test]
    fn test_set_content() {
        let mut map = ReferenceMap::new();
        let id = map.insert(make_block("main", "old\n")).unwrap();

        assert!(map.set_content(&id, "new\n".to_string()));
        assert_eq!(map.get(&id).unwrap().source, "new\n");

        let other = ReferenceId::new(
            ReferenceName::from_str("ghost"),
            "test.md",
            Ordinal::Count(0),
        );
        assert!(!map.set_content(&other, String::new()));
    }

    #[test]
    fn test_insertion_order() {
        let mut map = ReferenceMap::new();
        map.insert(make_block("c", "third\n")).unwrap();
        map.insert(make_block("a", "first\n")).unwrap();
        map.insert(make_block("b", "second\n")).unwrap();

        let sources: Vec<_> = map.iter().map(|(_, b)| b.source.as_str()).collect();
        assert_eq!(sources, vec!["third\n", "first\n", "second\n"]);
    }
}
