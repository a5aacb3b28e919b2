use serde_json::Value;

use crate::foundation::core::Point;
use crate::foundation::error::SkeneResult;
use crate::render::backend::{GraphicsBackend, PaintState};
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, prop, restyle};
use crate::style::paint::PaintStyle;

/// Off-screen compositing container (`skSurface`).
///
/// Children (canvases) draw into a private native surface, allocated on first render.
/// The result is snapshotted and drawn into the parent canvas at `(dx, dy)`.
pub struct SurfaceNode<G: GraphicsBackend> {
    width: u32,
    height: u32,
    dx: f64,
    dy: f64,
    paint_style: Option<PaintStyle>,
    surface: Option<G::Surface>,
    surface_size: (u32, u32),
    default_paint: Option<G::Paint>,
    render_paint: Option<G::Paint>,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl<G: GraphicsBackend> SurfaceNode<G> {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] = &["width", "height"];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &["paint"];

    pub(crate) fn new(gfx: &mut G) -> Self {
        Self {
            width: 100,
            height: 100,
            dx: 0.0,
            dy: 0.0,
            paint_style: None,
            surface: None,
            surface_size: (0, 0),
            default_paint: Some(gfx.make_paint()),
            render_paint: None,
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "width" | "height" => check::<u32>(key, value),
            "dx" | "dy" => check::<f64>(key, value),
            "paint" => check::<Option<PaintStyle>>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "width" => self.width = prop(key, value)?,
            "height" => self.height = prop(key, value)?,
            "dx" => self.dx = prop(key, value)?,
            "dy" => self.dy = prop(key, value)?,
            "paint" => self.paint_style = prop(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Composite offset inside the parent canvas.
    pub fn offset(&self) -> Point {
        Point::new(self.dx, self.dy)
    }

    /// Move the composite offset.
    pub fn set_offset(&mut self, offset: Point) {
        (self.dx, self.dy) = (offset.x, offset.y);
    }

    /// Replace the composite paint; marks paint dirty.
    pub fn set_paint(&mut self, style: Option<PaintStyle>) {
        self.paint_style = style;
        self.flags.paint = true;
    }

    /// Return `true` once the native surface exists.
    pub fn is_allocated(&self) -> bool {
        self.surface.is_some()
    }

    /// Hand out the native surface, allocating it on first use.
    ///
    /// The surface keeps its first size; later `width`/`height` changes do not reallocate it.
    /// The caller must give it back with [`SurfaceNode::put_target`].
    pub(crate) fn take_target(&mut self, gfx: &mut G) -> SkeneResult<G::Surface> {
        let size = (self.width, self.height);
        if let Some(s) = self.surface.take() {
            if self.surface_size != size && self.flags.layout {
                tracing::warn!(
                    allocated = ?self.surface_size,
                    requested = ?size,
                    "surface size changed after allocation; keeping the first size"
                );
            }
            self.flags.layout = false;
            return Ok(s);
        }
        let s = gfx.make_surface(self.width, self.height)?;
        self.surface_size = size;
        self.flags.layout = false;
        Ok(s)
    }

    pub(crate) fn put_target(&mut self, surface: G::Surface) {
        self.surface = Some(surface);
    }

    /// Snapshot the private surface and draw it into `target`.
    pub(crate) fn composite(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let image = gfx.snapshot(surface)?;

        let stale = self.render_paint.is_none() && self.paint_style.is_some();
        if self.flags.paint || stale {
            if let Some(old) = self.render_paint.take() {
                gfx.delete_paint(old);
            }
            if let Some(style) = &self.paint_style {
                let mut paint = gfx.make_paint();
                if let Err(e) = restyle(&mut paint, PaintState::default(), Some(style)) {
                    gfx.delete_paint(paint);
                    gfx.delete_image(image);
                    return Err(e);
                }
                self.render_paint = Some(paint);
            }
            self.flags.paint = false;
        }

        let paint = self.render_paint.as_ref().or(self.default_paint.as_ref());
        if let Some(paint) = paint {
            gfx.draw_image(target, &image, self.offset(), paint);
        }
        gfx.delete_image(image);
        self.flags.dirty = false;
        Ok(())
    }

    /// Render paint used by composites, if a `paint` prop was set.
    pub fn render_paint(&self) -> Option<&G::Paint> {
        self.render_paint.as_ref()
    }

    pub(crate) fn delete(&mut self, gfx: &mut G) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        if let Some(surface) = self.surface.take() {
            gfx.delete_surface(surface);
        }
        if let Some(paint) = self.default_paint.take() {
            gfx.delete_paint(paint);
        }
        if let Some(paint) = self.render_paint.take() {
            gfx.delete_paint(paint);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/container/surface.rs"]
mod tests;
