use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::{GraphicsBackend, PaintHandle, PaintState};
use crate::scene::container::canvas::CanvasNode;
use crate::scene::container::surface::SurfaceNode;
use crate::scene::flags::DirtyFlags;
use crate::scene::leaf::line::LineNode;
use crate::scene::leaf::paragraph::ParagraphNode;
use crate::scene::leaf::path::PathNode;
use crate::scene::leaf::rect::RectNode;
use crate::scene::leaf::text::TextNode;
use crate::style::paint::{PaintStyle, apply_paint_style};

/// Closed set of scene node kinds, one per element tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// `skCanvas`
    #[serde(rename = "skCanvas")]
    Canvas,
    /// `skSurface`
    #[serde(rename = "skSurface")]
    Surface,
    /// `skLine`
    #[serde(rename = "skLine")]
    Line,
    /// `skRrect`
    #[serde(rename = "skRrect")]
    Rect,
    /// `skText`
    #[serde(rename = "skText")]
    Text,
    /// `skPath`
    #[serde(rename = "skPath")]
    Path,
    /// `skParagraph`
    #[serde(rename = "skParagraph")]
    Paragraph,
}

/// Element tags map 1:1 onto node kinds.
pub type ElementType = NodeKind;

impl NodeKind {
    /// Element tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Canvas => "skCanvas",
            Self::Surface => "skSurface",
            Self::Line => "skLine",
            Self::Rect => "skRrect",
            Self::Text => "skText",
            Self::Path => "skPath",
            Self::Paragraph => "skParagraph",
        }
    }

    /// Canvas and Surface own children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Canvas | Self::Surface)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = SkeneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skCanvas" => Ok(Self::Canvas),
            "skSurface" => Ok(Self::Surface),
            "skLine" => Ok(Self::Line),
            "skRrect" => Ok(Self::Rect),
            "skText" => Ok(Self::Text),
            "skPath" => Ok(Self::Path),
            "skParagraph" => Ok(Self::Paragraph),
            other => Err(SkeneError::structural(format!("unknown element type \"{other}\""))),
        }
    }
}

/// A retained scene node.
#[allow(missing_docs)]
pub enum Node<G: GraphicsBackend> {
    Canvas(CanvasNode),
    Surface(SurfaceNode<G>),
    Line(LineNode<G>),
    Rect(RectNode<G>),
    Text(TextNode<G>),
    Path(PathNode<G>),
    Paragraph(ParagraphNode<G>),
}

impl<G: GraphicsBackend> std::fmt::Debug for Node<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("flags", &self.flags())
            .field("deleted", &self.is_deleted())
            .finish()
    }
}

macro_rules! each_node {
    ($node:expr, $n:ident => $body:expr) => {
        match $node {
            Node::Canvas($n) => $body,
            Node::Surface($n) => $body,
            Node::Line($n) => $body,
            Node::Rect($n) => $body,
            Node::Text($n) => $body,
            Node::Path($n) => $body,
            Node::Paragraph($n) => $body,
        }
    };
}

macro_rules! accessors {
    ($($variant:ident, $ty:ty, $get:ident, $get_mut:ident;)*) => {
        $(
            #[doc = concat!("Borrow as a `", stringify!($variant), "` node.")]
            pub fn $get(&self) -> Option<&$ty> {
                match self {
                    Node::$variant(n) => Some(n),
                    _ => None,
                }
            }

            #[doc = concat!("Mutably borrow as a `", stringify!($variant), "` node.")]
            pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Node::$variant(n) => Some(n),
                    _ => None,
                }
            }
        )*
    };
}

impl<G: GraphicsBackend> Node<G> {
    /// Construct a node of `kind`, allocating its default native resources.
    pub fn create(kind: NodeKind, gfx: &mut G) -> Self {
        match kind {
            NodeKind::Canvas => Self::Canvas(CanvasNode::new()),
            NodeKind::Surface => Self::Surface(SurfaceNode::new(gfx)),
            NodeKind::Line => Self::Line(LineNode::new(gfx)),
            NodeKind::Rect => Self::Rect(RectNode::new(gfx)),
            NodeKind::Text => Self::Text(TextNode::new(gfx)),
            NodeKind::Path => Self::Path(PathNode::new(gfx)),
            NodeKind::Paragraph => Self::Paragraph(ParagraphNode::new()),
        }
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Canvas(_) => NodeKind::Canvas,
            Self::Surface(_) => NodeKind::Surface,
            Self::Line(_) => NodeKind::Line,
            Self::Rect(_) => NodeKind::Rect,
            Self::Text(_) => NodeKind::Text,
            Self::Path(_) => NodeKind::Path,
            Self::Paragraph(_) => NodeKind::Paragraph,
        }
    }

    /// Invalidation state.
    pub fn flags(&self) -> DirtyFlags {
        each_node!(self, n => n.flags)
    }

    /// Mutable invalidation state.
    pub fn flags_mut(&mut self) -> &mut DirtyFlags {
        each_node!(self, n => &mut n.flags)
    }

    /// Return `true` once [`Node::delete`] has run.
    pub fn is_deleted(&self) -> bool {
        each_node!(self, n => n.deleted)
    }

    /// Prop keys whose change requires a layout rebuild.
    pub fn layout_properties(&self) -> &'static [&'static str] {
        match self {
            Self::Canvas(_) => CanvasNode::LAYOUT_PROPS,
            Self::Surface(_) => SurfaceNode::<G>::LAYOUT_PROPS,
            Self::Line(_) => LineNode::<G>::LAYOUT_PROPS,
            Self::Rect(_) => RectNode::<G>::LAYOUT_PROPS,
            Self::Text(_) => TextNode::<G>::LAYOUT_PROPS,
            Self::Path(_) => PathNode::<G>::LAYOUT_PROPS,
            Self::Paragraph(_) => ParagraphNode::<G>::LAYOUT_PROPS,
        }
    }

    /// Prop keys whose change requires a paint rebuild.
    pub fn style_properties(&self) -> &'static [&'static str] {
        match self {
            Self::Canvas(_) => CanvasNode::STYLE_PROPS,
            Self::Surface(_) => SurfaceNode::<G>::STYLE_PROPS,
            Self::Line(_) => LineNode::<G>::STYLE_PROPS,
            Self::Rect(_) => RectNode::<G>::STYLE_PROPS,
            Self::Text(_) => TextNode::<G>::STYLE_PROPS,
            Self::Path(_) => PathNode::<G>::STYLE_PROPS,
            Self::Paragraph(_) => ParagraphNode::<G>::STYLE_PROPS,
        }
    }

    /// Decode one prop value for a node of `kind` without assigning it.
    ///
    /// Returns `Ok(false)` for a key the kind does not know.
    pub fn check_prop(kind: NodeKind, key: &str, value: &Value) -> SkeneResult<bool> {
        match kind {
            NodeKind::Canvas => CanvasNode::check_prop(key, value),
            NodeKind::Surface => SurfaceNode::<G>::check_prop(key, value),
            NodeKind::Line => LineNode::<G>::check_prop(key, value),
            NodeKind::Rect => RectNode::<G>::check_prop(key, value),
            NodeKind::Text => TextNode::<G>::check_prop(key, value),
            NodeKind::Path => PathNode::<G>::check_prop(key, value),
            NodeKind::Paragraph => ParagraphNode::<G>::check_prop(key, value),
        }
    }

    /// Assign one prop value onto the node.
    ///
    /// Returns `Ok(false)` for a key the node does not know. Flags are left to the caller.
    pub fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        each_node!(self, n => n.set_prop(key, value))
    }

    /// Release every native resource the node owns. Later calls do nothing.
    pub fn delete(&mut self, gfx: &mut G) {
        each_node!(self, n => n.delete(gfx))
    }

    /// Draw a leaf into `target`, rebuilding whatever its flags mark stale.
    ///
    /// Containers are rendered by [`SceneGraph`](crate::scene::graph::SceneGraph), which
    /// owns their children.
    pub(crate) fn render_leaf(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        match self {
            Self::Line(n) => n.render(gfx, target),
            Self::Rect(n) => n.render(gfx, target),
            Self::Text(n) => n.render(gfx, target),
            Self::Path(n) => n.render(gfx, target),
            Self::Paragraph(n) => n.render(gfx, target),
            Self::Canvas(_) | Self::Surface(_) => Err(SkeneError::structural(format!(
                "{} is a container",
                self.kind()
            ))),
        }
    }

    accessors! {
        Canvas, CanvasNode, as_canvas, as_canvas_mut;
        Surface, SurfaceNode<G>, as_surface, as_surface_mut;
        Line, LineNode<G>, as_line, as_line_mut;
        Rect, RectNode<G>, as_rect, as_rect_mut;
        Text, TextNode<G>, as_text, as_text_mut;
        Path, PathNode<G>, as_path, as_path_mut;
        Paragraph, ParagraphNode<G>, as_paragraph, as_paragraph_mut;
    }
}

/// Decode one prop value.
pub(crate) fn prop<T: DeserializeOwned>(key: &str, value: &Value) -> SkeneResult<T> {
    T::deserialize(value)
        .map_err(|e| SkeneError::validation(format!("invalid value for prop \"{key}\": {e}")))
}

/// Decode one prop value and drop it.
pub(crate) fn check<T: DeserializeOwned>(key: &str, value: &Value) -> SkeneResult<bool> {
    prop::<T>(key, value).map(|_| true)
}

/// Reset `paint` to `base`, then apply `style` on top.
pub(crate) fn restyle<P: PaintHandle>(
    paint: &mut P,
    base: PaintState,
    style: Option<&PaintStyle>,
) -> SkeneResult<()> {
    *paint.state_mut() = base;
    match style {
        Some(style) => apply_paint_style(paint, style),
        None => Ok(()),
    }
}

/// Fill paint with the given color, anti-aliased.
pub(crate) fn filled(color: crate::foundation::core::Color) -> PaintState {
    PaintState {
        color,
        anti_alias: true,
        ..PaintState::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
