//! skene is a retained scene graph drawn through an immediate-mode 2D backend.
//!
//! An application describes its scene as a tree of [`Element`]s. Mounting the tree on a
//! [`Runtime`] reconciles it into long-lived scene nodes owned by a [`RootState`]; each
//! node keeps its native paint, font, path and paragraph objects alive between frames and
//! rebuilds them only when its dirty flags say so.
//!
//! - Describe a scene with [`Element`] (or parse it from JSON)
//! - Mount it with [`Runtime::mount`] on any [`GraphicsBackend`]
//! - Drive [`Runtime::frame`] from the host's animation-frame callback
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Shared value types, errors, and mount configuration.
pub mod foundation;
/// Reconciler-facing host layer.
pub mod host;
/// Drawing backends.
pub mod render;
/// Frame loop and mounted roots.
pub mod runtime;
/// Scene nodes and the retained tree.
pub mod scene;
/// Paint, color, and paragraph style descriptors.
pub mod style;
/// Text cursor, selection, and editing.
pub mod text;

pub use crate::foundation::config::{FrameloopMode, MountOpts};
pub use crate::foundation::core::{Color, RRect, TargetId};
pub use crate::foundation::error::{SkeneError, SkeneResult};
pub use crate::host::config::HostConfig;
pub use crate::host::element::Element;
pub use crate::host::reconcile::Reconciler;
pub use crate::render::backend::{GraphicsBackend, LineMetrics, PaintHandle, ParagraphHandle};
pub use crate::render::cpu::{CpuBackend, CpuBackendOpts};
pub use crate::render::recording::RecordingBackend;
pub use crate::runtime::frameloop::{FrameReport, Runtime};
pub use crate::runtime::root::RootState;
pub use crate::runtime::subscription::{FrameOpts, Sequence, Unsubscribe};
pub use crate::scene::graph::{NodeId, SceneGraph};
pub use crate::scene::node::{Node, NodeKind};
pub use crate::style::paint::PaintStyle;
pub use crate::style::paragraph::ParagraphStyle;
pub use crate::text::cursor::Cursor;
pub use crate::text::editor::{DeleteMode, TextEditor};
