use serde_json::Value;

use crate::foundation::core::{Color, RRect, Rect};
use crate::foundation::error::SkeneResult;
use crate::render::backend::{GraphicsBackend, PaintHandle, PaintState};
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, filled, prop, restyle};
use crate::style::paint::PaintStyle;

/// Rounded rectangle leaf (`skRrect`).
pub struct RectNode<G: GraphicsBackend> {
    x: f64,
    y: f64,
    rx: f64,
    ry: f64,
    width: f64,
    height: f64,
    style: Option<PaintStyle>,
    paint: Option<G::Paint>,
    rrect: Option<RRect>,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl<G: GraphicsBackend> RectNode<G> {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] =
        &["x", "y", "rx", "ry", "width", "height"];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &["style"];

    pub(crate) fn new(gfx: &mut G) -> Self {
        let mut paint = gfx.make_paint();
        *paint.state_mut() = Self::base_paint();
        Self {
            x: 0.0,
            y: 0.0,
            rx: 0.0,
            ry: 0.0,
            width: 10.0,
            height: 10.0,
            style: None,
            paint: Some(paint),
            rrect: None,
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    fn base_paint() -> PaintState {
        filled(Color::BLACK)
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "x" | "y" | "rx" | "ry" | "width" | "height" => check::<f64>(key, value),
            "style" => check::<Option<PaintStyle>>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "x" => self.x = prop(key, value)?,
            "y" => self.y = prop(key, value)?,
            "rx" => self.rx = prop(key, value)?,
            "ry" => self.ry = prop(key, value)?,
            "width" => self.width = prop(key, value)?,
            "height" => self.height = prop(key, value)?,
            "style" => self.style = prop(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Move and resize; marks layout dirty.
    pub fn set_frame(&mut self, x: f64, y: f64, width: f64, height: f64) {
        (self.x, self.y, self.width, self.height) = (x, y, width, height);
        self.flags.layout = true;
    }

    /// Change the corner radii; marks layout dirty.
    pub fn set_radii(&mut self, rx: f64, ry: f64) {
        (self.rx, self.ry) = (rx, ry);
        self.flags.layout = true;
    }

    /// Replace the paint style; marks paint dirty.
    pub fn set_style(&mut self, style: Option<PaintStyle>) {
        self.style = style;
        self.flags.paint = true;
    }

    /// Current `(x, y, width, height)`.
    pub fn frame(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }

    /// Geometry computed by the last layout.
    pub fn rrect(&self) -> Option<&RRect> {
        self.rrect.as_ref()
    }

    /// Resolved paint.
    pub fn paint(&self) -> Option<&G::Paint> {
        self.paint.as_ref()
    }

    /// Recompute the rounded-rect geometry.
    pub fn layout(&mut self) {
        let rect = Rect::new(self.x, self.y, self.x + self.width, self.y + self.height);
        self.rrect = Some(RRect::new(rect, self.rx, self.ry));
        self.flags.layout = false;
    }

    pub(crate) fn render(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        if self.flags.layout || self.rrect.is_none() {
            self.layout();
        }
        if let Some(paint) = self.paint.as_mut() {
            if self.flags.paint {
                restyle(paint, Self::base_paint(), self.style.as_ref())?;
                self.flags.paint = false;
            }
            if let Some(rr) = &self.rrect {
                gfx.draw_rrect(target, rr, paint);
            }
        }
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
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/leaf/rect.rs"]
mod tests;
