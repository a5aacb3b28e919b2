use serde_json::Value;

use crate::foundation::core::{Color, Point};
use crate::foundation::error::SkeneResult;
use crate::render::backend::{GraphicsBackend, PaintHandle, PaintState};
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, filled, prop, restyle};
use crate::style::paint::PaintStyle;

/// Straight line leaf (`skLine`). Drawn straight from its endpoints; there is no geometry cache.
pub struct LineNode<G: GraphicsBackend> {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    style: Option<PaintStyle>,
    paint: Option<G::Paint>,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl<G: GraphicsBackend> LineNode<G> {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] = &[];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &["style"];

    pub(crate) fn new(gfx: &mut G) -> Self {
        let mut paint = gfx.make_paint();
        *paint.state_mut() = Self::base_paint();
        Self {
            x1: 0.0,
            y1: 10.0,
            x2: 10.0,
            y2: 0.0,
            style: None,
            paint: Some(paint),
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    // Fill mode on a line is kept as-is.
    fn base_paint() -> PaintState {
        filled(Color::rgba(0.9, 0.0, 0.0, 1.0))
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "x1" | "y1" | "x2" | "y2" => check::<f64>(key, value),
            "style" => check::<Option<PaintStyle>>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "x1" => self.x1 = prop(key, value)?,
            "y1" => self.y1 = prop(key, value)?,
            "x2" => self.x2 = prop(key, value)?,
            "y2" => self.y2 = prop(key, value)?,
            "style" => self.style = prop(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Endpoints.
    pub fn points(&self) -> (Point, Point) {
        (Point::new(self.x1, self.y1), Point::new(self.x2, self.y2))
    }

    /// Move both endpoints.
    pub fn set_points(&mut self, p0: Point, p1: Point) {
        (self.x1, self.y1, self.x2, self.y2) = (p0.x, p0.y, p1.x, p1.y);
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

    pub(crate) fn render(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        self.flags.layout = false;
        let (p0, p1) = self.points();
        if let Some(paint) = self.paint.as_mut() {
            if self.flags.paint {
                restyle(paint, Self::base_paint(), self.style.as_ref())?;
                self.flags.paint = false;
            }
            gfx.draw_line(target, p0, p1, paint);
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
#[path = "../../../tests/unit/scene/leaf/line.rs"]
mod tests;
