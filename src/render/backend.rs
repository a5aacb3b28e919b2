use std::ops::Range;

use crate::foundation::core::{Color, PathCmd, Point, RRect, Rect};
use crate::foundation::error::SkeneResult;
use crate::style::paint::{BlendMode, PaintMode};
use crate::style::paragraph::ParagraphStyle;

/// Plain paint parameters carried by every backend paint handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintState {
    /// Color, including the alpha written by [`PaintHandle::set_alpha`].
    pub color: Color,
    /// Fill or stroke.
    pub mode: PaintMode,
    /// Stroke width; zero means hairline.
    pub stroke_width: f32,
    /// Miter limit for stroke joins.
    pub stroke_miter: f32,
    /// Anti-aliasing flag.
    pub anti_alias: bool,
    /// Blend mode.
    pub blend_mode: BlendMode,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            mode: PaintMode::Fill,
            stroke_width: 0.0,
            stroke_miter: 4.0,
            anti_alias: false,
            blend_mode: BlendMode::SrcOver,
        }
    }
}

/// In-place paint mutation.
///
/// Setters only write plain values; no backend resource is allocated.
pub trait PaintHandle {
    /// Current parameters.
    fn state(&self) -> &PaintState;
    /// Mutable parameters.
    fn state_mut(&mut self) -> &mut PaintState;

    /// Set the color.
    fn set_color(&mut self, color: Color) {
        self.state_mut().color = color;
    }
    /// Current color.
    fn color(&self) -> Color {
        self.state().color
    }
    /// Fill or stroke.
    fn set_mode(&mut self, mode: PaintMode) {
        self.state_mut().mode = mode;
    }
    /// Current paint mode.
    fn mode(&self) -> PaintMode {
        self.state().mode
    }
    /// Set the stroke width.
    fn set_stroke_width(&mut self, width: f32) {
        self.state_mut().stroke_width = width;
    }
    /// Current stroke width.
    fn stroke_width(&self) -> f32 {
        self.state().stroke_width
    }
    /// Set the miter limit.
    fn set_stroke_miter(&mut self, miter: f32) {
        self.state_mut().stroke_miter = miter;
    }
    /// Current miter limit.
    fn stroke_miter(&self) -> f32 {
        self.state().stroke_miter
    }
    /// Toggle anti-aliasing.
    fn set_anti_alias(&mut self, aa: bool) {
        self.state_mut().anti_alias = aa;
    }
    /// Return `true` when anti-aliased.
    fn anti_alias(&self) -> bool {
        self.state().anti_alias
    }
    /// Replace the alpha channel of the current color.
    fn set_alpha(&mut self, alpha: f32) {
        let state = self.state_mut();
        state.color = state.color.with_alpha(alpha.clamp(0.0, 1.0));
    }
    /// Alpha of the current color.
    fn alpha(&self) -> f32 {
        self.state().color.a
    }
    /// Set the blend mode.
    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state_mut().blend_mode = mode;
    }
    /// Current blend mode.
    fn blend_mode(&self) -> BlendMode {
        self.state().blend_mode
    }
}

/// Per-line layout metrics of a paragraph.
///
/// Indices are character indices into the paragraph text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// First character of the line.
    pub start_index: usize,
    /// End of the line, excluding a trailing newline.
    pub end_index: usize,
    /// End of the line with trailing whitespace removed.
    pub end_excluding_whitespace: usize,
    /// End of the line including a trailing newline.
    pub end_including_newline: usize,
    /// Zero-based line number.
    pub line_number: usize,
    /// Distance from the baseline to the line top.
    pub ascent: f64,
    /// Distance from the baseline to the line bottom.
    pub descent: f64,
    /// Line box height.
    pub height: f64,
    /// Advance width of the visible content.
    pub width: f64,
    /// Baseline offset from the paragraph top.
    pub baseline: f64,
    /// Left edge of the line after alignment.
    pub left: f64,
}

impl LineMetrics {
    /// Top edge of the line box.
    pub fn top(&self) -> f64 {
        self.baseline - self.ascent
    }
}

/// A shaped, laid-out block of text.
pub trait ParagraphHandle {
    /// Reflow to `width` without reshaping.
    fn layout(&mut self, width: f32);
    /// Metrics of every laid-out line, in order.
    fn line_metrics(&self) -> Vec<LineMetrics>;
    /// Character index closest to a point in paragraph space, or `None` on a miss.
    fn glyph_position_at(&self, x: f64, y: f64) -> Option<usize>;
    /// Word (or whitespace run) containing `index`.
    fn word_boundary(&self, index: usize) -> Range<usize>;
    /// Boxes covering the characters in `start..end`, one per line fragment.
    fn rects_for_range(&self, start: usize, end: usize) -> Vec<Rect>;
    /// Width last passed to [`ParagraphHandle::layout`].
    fn max_width(&self) -> f32;
    /// Total laid-out height.
    fn height(&self) -> f32;
    /// Characters in the source text, including any cut by `max_lines`.
    fn text_len(&self) -> usize;

    /// Number of laid-out lines.
    fn line_count(&self) -> usize {
        self.line_metrics().len()
    }
}

/// Native resource kinds with explicit lifetimes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum ResourceKind {
    Paint,
    Font,
    Path,
    Paragraph,
    Surface,
    Image,
}

/// Immediate-mode 2D graphics capability consumed by the scene graph.
///
/// Every resource returned by a `make_*`/`build_*` call stays alive until it is handed back to
/// the matching `delete_*` call. Deletion consumes the handle.
pub trait GraphicsBackend {
    /// Paint object.
    type Paint: PaintHandle;
    /// Sized typeface.
    type Font;
    /// Path geometry.
    type Path;
    /// Shaped paragraph.
    type Paragraph: ParagraphHandle;
    /// Drawing target.
    type Surface;
    /// Immutable snapshot of a surface.
    type Image;
    /// Font collection used for paragraph shaping.
    type FontManager: Clone;

    /// Allocate a paint with default parameters.
    fn make_paint(&mut self) -> Self::Paint;
    /// Allocate the default typeface at `size`.
    fn make_font(&mut self, size: f32) -> Self::Font;
    /// Parse SVG path data; `None` when it does not parse.
    fn make_path_from_svg(&mut self, svg: &str) -> Option<Self::Path>;
    /// Build a path from explicit commands.
    fn make_path_from_cmds(&mut self, cmds: &[PathCmd]) -> SkeneResult<Self::Path>;
    /// Process-wide default font collection.
    fn default_font_manager(&mut self) -> Self::FontManager;
    /// Shape `text`. The result needs a layout before it is drawn.
    fn build_paragraph(
        &mut self,
        style: &ParagraphStyle,
        text: &str,
        fonts: Option<&Self::FontManager>,
    ) -> SkeneResult<Self::Paragraph>;
    /// Allocate an offscreen surface.
    fn make_surface(&mut self, width: u32, height: u32) -> SkeneResult<Self::Surface>;
    /// Capture the current contents of a surface as an image.
    fn snapshot(&mut self, surface: &mut Self::Surface) -> SkeneResult<Self::Image>;

    /// Push the transform state.
    fn save(&mut self, target: &mut Self::Surface);
    /// Pop the transform state.
    fn restore(&mut self, target: &mut Self::Surface);
    /// Fill the whole surface with `color`.
    fn clear(&mut self, target: &mut Self::Surface, color: Color);
    /// Rotate by `degrees` about `(px, py)`.
    fn rotate(&mut self, target: &mut Self::Surface, degrees: f64, px: f64, py: f64);
    /// Draw a rounded rectangle.
    fn draw_rrect(&mut self, target: &mut Self::Surface, rrect: &RRect, paint: &Self::Paint);
    /// Draw a line segment.
    fn draw_line(&mut self, target: &mut Self::Surface, p0: Point, p1: Point, paint: &Self::Paint);
    /// Draw a single run of text with its baseline at `origin`.
    fn draw_text(
        &mut self,
        target: &mut Self::Surface,
        text: &str,
        origin: Point,
        paint: &Self::Paint,
        font: &Self::Font,
    );
    /// Draw a path.
    fn draw_path(&mut self, target: &mut Self::Surface, path: &Self::Path, paint: &Self::Paint);
    /// Draw a laid-out paragraph with its top-left at `origin`.
    fn draw_paragraph(
        &mut self,
        target: &mut Self::Surface,
        paragraph: &Self::Paragraph,
        origin: Point,
    );
    /// Draw an image with its top-left at `origin`.
    fn draw_image(
        &mut self,
        target: &mut Self::Surface,
        image: &Self::Image,
        origin: Point,
        paint: &Self::Paint,
    );
    /// Submit pending drawing so the surface contents are observable.
    fn flush(&mut self, target: &mut Self::Surface);

    /// Release a paint.
    fn delete_paint(&mut self, paint: Self::Paint);
    /// Release a font.
    fn delete_font(&mut self, font: Self::Font);
    /// Release a path.
    fn delete_path(&mut self, path: Self::Path);
    /// Release a paragraph.
    fn delete_paragraph(&mut self, paragraph: Self::Paragraph);
    /// Release a surface.
    fn delete_surface(&mut self, surface: Self::Surface);
    /// Release an image.
    fn delete_image(&mut self, image: Self::Image);
}
