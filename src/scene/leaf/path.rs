use serde_json::Value;

use crate::foundation::core::{Color, PathCmd};
use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::{GraphicsBackend, PaintHandle, PaintState};
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, filled, prop, restyle};
use crate::style::paint::PaintStyle;

/// Path leaf (`skPath`), built from SVG path data or explicit commands.
pub struct PathNode<G: GraphicsBackend> {
    svg: Option<String>,
    cmds: Option<Vec<PathCmd>>,
    style: Option<PaintStyle>,
    paint: Option<G::Paint>,
    path: Option<G::Path>,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl<G: GraphicsBackend> PathNode<G> {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] = &["svg", "cmds"];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &["style"];

    pub(crate) fn new(gfx: &mut G) -> Self {
        let mut paint = gfx.make_paint();
        *paint.state_mut() = Self::base_paint();
        Self {
            svg: None,
            cmds: None,
            style: None,
            paint: Some(paint),
            path: None,
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    fn base_paint() -> PaintState {
        filled(Color::rgba(1.0, 0.0, 0.0, 1.0))
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "svg" => check::<Option<String>>(key, value),
            "cmds" => check::<Option<Vec<PathCmd>>>(key, value),
            "style" => check::<Option<PaintStyle>>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "svg" => self.svg = prop(key, value)?,
            "cmds" => self.cmds = prop(key, value)?,
            "style" => self.style = prop(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Replace the SVG path data; marks layout dirty.
    pub fn set_svg(&mut self, svg: Option<String>) {
        self.svg = svg;
        self.flags.layout = true;
    }

    /// Replace the command list; marks layout dirty.
    pub fn set_cmds(&mut self, cmds: Option<Vec<PathCmd>>) {
        self.cmds = cmds;
        self.flags.layout = true;
    }

    /// Replace the paint style; marks paint dirty.
    pub fn set_style(&mut self, style: Option<PaintStyle>) {
        self.style = style;
        self.flags.paint = true;
    }

    /// Current native path.
    pub fn path(&self) -> Option<&G::Path> {
        self.path.as_ref()
    }

    /// Resolved paint.
    pub fn paint(&self) -> Option<&G::Paint> {
        self.paint.as_ref()
    }

    /// Rebuild the native path. `svg` wins over `cmds`; with neither the path is empty.
    pub fn layout(&mut self, gfx: &mut G) -> SkeneResult<()> {
        if let Some(old) = self.path.take() {
            gfx.delete_path(old);
        }
        let path = match (&self.svg, &self.cmds) {
            (Some(svg), _) => gfx
                .make_path_from_svg(svg)
                .ok_or_else(|| SkeneError::validation(format!("invalid svg path data \"{svg}\"")))?,
            (None, Some(cmds)) => gfx.make_path_from_cmds(cmds)?,
            (None, None) => gfx.make_path_from_cmds(&[])?,
        };
        tracing::debug!(svg = self.svg.is_some(), "path rebuilt");
        self.path = Some(path);
        self.flags.layout = false;
        Ok(())
    }

    pub(crate) fn render(&mut self, gfx: &mut G, target: &mut G::Surface) -> SkeneResult<()> {
        if self.flags.layout || self.path.is_none() {
            self.layout(gfx)?;
        }
        let (Some(paint), Some(path)) = (self.paint.as_mut(), self.path.as_ref()) else {
            return Ok(());
        };
        if self.flags.paint {
            restyle(paint, Self::base_paint(), self.style.as_ref())?;
            self.flags.paint = false;
        }
        gfx.draw_path(target, path, paint);
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
        if let Some(path) = self.path.take() {
            gfx.delete_path(path);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/leaf/path.rs"]
mod tests;
