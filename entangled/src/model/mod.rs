//! Core model types for Entangled.

mod code_block;
mod properties;
mod reference_id;
mod reference_map;
mod reference_name;
mod tangle;

pub use code_block::{split_inclusive, CodeBlock};
pub use properties::{parse_properties, Properties, Property};
pub use reference_id::{Ordinal, ReferenceId};
pub use reference_map::ReferenceMap;
pub use reference_name::ReferenceName;
pub use tangle::{tangle_target, CycleDetector};
