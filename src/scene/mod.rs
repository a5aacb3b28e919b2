//! Retained scene nodes and the tree that owns them.

pub mod container;
/// Dirty flags.
pub mod flags;
pub mod graph;
pub mod leaf;
/// Node enum and element tags.
pub mod node;
