//! Mounted roots and the frame loop that repaints them.

/// Frame clock.
pub mod clock;
pub mod frameloop;
/// Per-target root state.
pub mod root;
pub mod subscription;
