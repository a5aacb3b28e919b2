//! Drawable leaf nodes.

/// `skLine`.
pub mod line;
/// `skParagraph`.
pub mod paragraph;
/// `skPath`.
pub mod path;
/// `skRrect`.
pub mod rect;
/// `skText`.
pub mod text;
