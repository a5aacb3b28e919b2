//! Nodes that own ordered children.

/// `skCanvas`: clear, rotate, and flush around its children.
pub mod canvas;
/// `skSurface`: offscreen target composited into its parent.
pub mod surface;
