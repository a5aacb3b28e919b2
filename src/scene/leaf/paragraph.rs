use std::ops::Range;

use serde_json::Value;

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::{GraphicsBackend, LineMetrics, ParagraphHandle};
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, prop};
use crate::style::paragraph::ParagraphStyle;

/// Wrapped multi-line text leaf (`skParagraph`).
///
/// `build` shapes text into a new native paragraph and is the expensive step; `layout`
/// only reflows the existing one to a width. Text and style changes need a build, width
/// changes only a layout.
pub struct ParagraphNode<G: GraphicsBackend> {
    x: f64,
    y: f64,
    width: f32,
    text: String,
    paragraph_style: ParagraphStyle,
    font_manager: Option<G::FontManager>,
    paragraph: Option<G::Paragraph>,
    needs_build: bool,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl<G: GraphicsBackend> ParagraphNode<G> {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] = &["text", "width", "paragraphStyle"];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &[];

    pub(crate) fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            text: String::new(),
            paragraph_style: ParagraphStyle::default(),
            font_manager: None,
            paragraph: None,
            needs_build: true,
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "x" | "y" => check::<f64>(key, value),
            "width" => check::<f32>(key, value),
            "text" => check::<String>(key, value),
            "paragraphStyle" => check::<ParagraphStyle>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "x" => self.x = prop(key, value)?,
            "y" => self.y = prop(key, value)?,
            "width" => self.width = prop(key, value)?,
            "text" => {
                let text: String = prop(key, value)?;
                if text != self.text {
                    self.text = text;
                    self.needs_build = true;
                }
            }
            "paragraphStyle" => {
                let style: ParagraphStyle = prop(key, value)?;
                if style != self.paragraph_style {
                    self.paragraph_style = style;
                    self.needs_build = true;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text; marks layout dirty and schedules a rebuild.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needs_build = true;
        self.flags.layout = true;
    }

    /// Layout width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Change the layout width; marks layout dirty.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.flags.layout = true;
    }

    /// Draw origin.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the draw origin.
    pub fn set_origin(&mut self, origin: Point) {
        (self.x, self.y) = (origin.x, origin.y);
    }

    /// Paragraph style.
    pub fn paragraph_style(&self) -> &ParagraphStyle {
        &self.paragraph_style
    }

    /// Replace the paragraph style; marks layout dirty and schedules a rebuild.
    pub fn set_paragraph_style(&mut self, style: ParagraphStyle) {
        self.paragraph_style = style;
        self.needs_build = true;
        self.flags.layout = true;
    }

    /// Use `fonts` instead of the backend default on the next build.
    pub fn set_font_manager(&mut self, fonts: Option<G::FontManager>) {
        self.font_manager = fonts;
        self.needs_build = true;
        self.flags.layout = true;
    }

    /// Native paragraph from the last build.
    pub fn paragraph(&self) -> Option<&G::Paragraph> {
        self.paragraph.as_ref()
    }

    /// Shape the text into a new native paragraph, releasing the previous one first.
    pub fn build(&mut self, gfx: &mut G) -> SkeneResult<()> {
        if let Some(old) = self.paragraph.take() {
            gfx.delete_paragraph(old);
        }
        let fonts = match &self.font_manager {
            Some(fonts) => fonts.clone(),
            None => gfx.default_font_manager(),
        };
        let paragraph = gfx.build_paragraph(&self.paragraph_style, &self.text, Some(&fonts))?;
        tracing::debug!(chars = self.text.chars().count(), "paragraph rebuilt");
        self.paragraph = Some(paragraph);
        self.needs_build = false;
        Ok(())
    }

    /// Reflow the built paragraph to `width` without reshaping.
    pub fn layout(&mut self, width: f32) -> SkeneResult<()> {
        let paragraph = self
            .paragraph
            .as_mut()
            .ok_or_else(|| SkeneError::structural("paragraph laid out before it was built"))?;
        paragraph.layout(width);
        self.flags.layout = false;
        Ok(())
    }

    /// Build (when text or style changed) and lay out at the node width.
    pub fn ensure_layout(&mut self, gfx: &mut G) -> SkeneResult<()> {
        if self.needs_build || self.paragraph.is_none() {
            self.build(gfx)?;
        }
        self.layout(self.width)
    }

    /// Per-line metrics of the current layout. Empty before the first layout.
    pub fn line_metrics(&self) -> Vec<LineMetrics> {
        self.paragraph
            .as_ref()
            .map(ParagraphHandle::line_metrics)
            .unwrap_or_default()
    }

    /// Character index under `(x, y)` in paragraph space, or `None` on a miss.
    pub fn glyph_position_at(&self, x: f64, y: f64) -> Option<usize> {
        self.paragraph.as_ref()?.glyph_position_at(x, y)
    }

    /// Word (or whitespace run) containing `index`.
    pub fn word_boundary(&self, index: usize) -> Range<usize> {
        match &self.paragraph {
            Some(p) => p.word_boundary(index),
            None => index..index,
        }
    }

    /// Boxes covering `start..end`, in paragraph space.
    pub fn rects_for_range(&self, start: usize, end: usize) -> Vec<Rect> {
        self.paragraph
            .as_ref()
            .map(|p| p.rects_for_range(start, end))
            .unwrap_or_default()
    }

    pub(crate) fn render(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        if self.flags.layout || self.paragraph.is_none() {
            self.ensure_layout(gfx)?;
        }
        self.flags.paint = false;
        if let Some(paragraph) = &self.paragraph {
            gfx.draw_paragraph(target, paragraph, self.origin());
        }
        Ok(())
    }

    pub(crate) fn delete(&mut self, gfx: &mut G) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        if let Some(paragraph) = self.paragraph.take() {
            gfx.delete_paragraph(paragraph);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/leaf/paragraph.rs"]
mod tests;
