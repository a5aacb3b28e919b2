/// Per-root mount options.
pub mod config;
/// Geometry and color value types.
pub mod core;
/// Error type shared by every layer.
pub mod error;
