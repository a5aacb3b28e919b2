//! Cursor, selection and editing over laid-out paragraphs.

/// Word boundaries over plain text.
pub mod boundary;
/// Multi-click detection.
pub mod click;
/// Caret movement and selection.
pub mod cursor;
pub mod editor;
/// Index to line/column mapping.
pub mod position;
