use serde_json::Value;

use crate::foundation::core::{Color, Point};
use crate::foundation::error::SkeneResult;
use crate::render::backend::{GraphicsBackend, PaintHandle, PaintState};
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, filled, prop, restyle};
use crate::style::paint::PaintStyle;

const DEFAULT_FONT_SIZE: f32 = 40.0;

/// Single-line text leaf (`skText`), drawn baseline-relative at `(x, y)` without wrapping.
pub struct TextNode<G: GraphicsBackend> {
    text: String,
    x: f64,
    y: f64,
    font_size: f32,
    style: Option<PaintStyle>,
    paint: Option<G::Paint>,
    font: Option<G::Font>,
    font_built_at: f32,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl<G: GraphicsBackend> TextNode<G> {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] = &["fontSize"];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &["style"];

    pub(crate) fn new(gfx: &mut G) -> Self {
        let mut paint = gfx.make_paint();
        *paint.state_mut() = Self::base_paint();
        let font = gfx.make_font(DEFAULT_FONT_SIZE);
        Self {
            text: "hello".to_owned(),
            x: 0.0,
            y: 0.0,
            font_size: DEFAULT_FONT_SIZE,
            style: None,
            paint: Some(paint),
            font: Some(font),
            font_built_at: DEFAULT_FONT_SIZE,
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    fn base_paint() -> PaintState {
        filled(Color::BLACK)
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "text" => check::<String>(key, value),
            "x" | "y" => check::<f64>(key, value),
            "fontSize" => check::<f32>(key, value),
            "style" => check::<Option<PaintStyle>>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "text" => self.text = prop(key, value)?,
            "x" => self.x = prop(key, value)?,
            "y" => self.y = prop(key, value)?,
            "fontSize" => self.font_size = prop(key, value)?,
            "style" => self.style = prop(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Current string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the string. Takes effect on the next render.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Baseline origin.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the baseline origin.
    pub fn set_origin(&mut self, origin: Point) {
        (self.x, self.y) = (origin.x, origin.y);
    }

    /// Font size in pixels.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Change the font size; marks layout dirty so the font is rebuilt.
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
        self.flags.layout = true;
    }

    /// Replace the paint style; marks paint dirty.
    pub fn set_style(&mut self, style: Option<PaintStyle>) {
        self.style = style;
        self.flags.paint = true;
    }

    /// Resolved paint.
    pub fn paint(&self) -> Option<&G::Paint> {
        self.paint.as_ref()
    }

    /// Current native font.
    pub fn font(&self) -> Option<&G::Font> {
        self.font.as_ref()
    }

    /// Rebuild the native font at the current size, releasing the previous one.
    pub fn layout(&mut self, gfx: &mut G) {
        if let Some(old) = self.font.take() {
            gfx.delete_font(old);
        }
        self.font = Some(gfx.make_font(self.font_size));
        self.font_built_at = self.font_size;
        self.flags.layout = false;
    }

    pub(crate) fn render(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        if self.flags.layout {
            if self.font.is_none() || self.font_size != self.font_built_at {
                self.layout(gfx);
            }
            self.flags.layout = false;
        }
        let origin = self.origin();
        let (Some(paint), Some(font)) = (self.paint.as_mut(), self.font.as_ref()) else {
            return Ok(());
        };
        if self.flags.paint {
            restyle(paint, Self::base_paint(), self.style.as_ref())?;
            self.flags.paint = false;
        }
        gfx.draw_text(target, &self.text, origin, paint, font);
        Ok(())
    }

    pub(crate) fn delete(&mut self, gfx: &mut G) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        if let Some(paint) = self.paint.take() {
            gfx.delete_paint(paint);
        }
        if let Some(font) = self.font.take() {
            gfx.delete_font(font);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/leaf/text.rs"]
mod tests;
