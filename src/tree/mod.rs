//! Generic ordered multi-way tree.
//!
//! The tree knows nothing about files or directories. It stores values that
//! carry a name, links them into a single-rooted hierarchy and offers glob
//! lookups over those names.

mod pattern;
mod tree;

pub use indextree::NodeId;
pub use pattern::{Pattern, PatternError};
pub use tree::{Named, Subtree, Target, Tree, TreeError};
