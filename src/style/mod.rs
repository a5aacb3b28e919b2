/// Color descriptors and CSS color parsing.
pub mod color;
/// Paint descriptors.
pub mod paint;
/// Paragraph and text styles.
pub mod paragraph;
