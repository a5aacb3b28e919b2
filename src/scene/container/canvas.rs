use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::error::SkeneResult;
use crate::render::backend::GraphicsBackend;
use crate::scene::flags::DirtyFlags;
use crate::scene::node::{check, prop};
use crate::style::color::{ColorDescriptor, resolve_color};

/// Rotation applied to a canvas before its children draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotate {
    /// Angle in degrees, clockwise.
    pub degree: f64,
    /// Pivot x.
    pub px: f64,
    /// Pivot y.
    pub py: f64,
}

/// Drawing-target container (`skCanvas`).
///
/// The canvas draws into whatever surface its parent hands it; it owns no native handle of
/// its own, so deleting it only marks it deleted.
#[derive(Debug)]
pub struct CanvasNode {
    clear: Option<ColorDescriptor>,
    rotate: Option<Rotate>,
    pub(crate) flags: DirtyFlags,
    pub(crate) deleted: bool,
}

impl Default for CanvasNode {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasNode {
    pub(crate) const LAYOUT_PROPS: &'static [&'static str] = &[];
    pub(crate) const STYLE_PROPS: &'static [&'static str] = &[];

    pub(crate) fn new() -> Self {
        Self {
            clear: Some(ColorDescriptor::css("#FFFFFF")),
            rotate: None,
            flags: DirtyFlags::default(),
            deleted: false,
        }
    }

    pub(crate) fn check_prop(key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "clear" => check::<Option<ColorDescriptor>>(key, value),
            "rotate" => check::<Option<Rotate>>(key, value),
            _ => Ok(false),
        }
    }

    pub(crate) fn set_prop(&mut self, key: &str, value: &Value) -> SkeneResult<bool> {
        match key {
            "clear" => self.clear = prop(key, value)?,
            "rotate" => self.rotate = prop(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Clear color; `None` leaves previous contents in place.
    pub fn clear_color(&self) -> Option<&ColorDescriptor> {
        self.clear.as_ref()
    }

    /// Replace the clear color.
    pub fn set_clear(&mut self, clear: Option<ColorDescriptor>) {
        self.clear = clear;
    }

    /// Current rotation.
    pub fn rotation(&self) -> Option<Rotate> {
        self.rotate
    }

    /// Replace the rotation.
    pub fn set_rotate(&mut self, rotate: Option<Rotate>) {
        self.rotate = rotate;
    }

    /// Push a save point, clear, and rotate. Children draw between `begin` and `end`.
    pub(crate) fn begin<G: GraphicsBackend>(
        &mut self,
        gfx: &mut G,
        target: &mut G::Surface,
    ) -> SkeneResult<()> {
        let clear = match &self.clear {
            Some(ColorDescriptor::Css(s)) if s.trim().is_empty() => None,
            Some(desc) => Some(resolve_color(desc)?),
            None => None,
        };
        gfx.save(target);
        if let Some(color) = clear {
            gfx.clear(target, color);
        }
        if let Some(r) = self.rotate {
            gfx.rotate(target, r.degree, r.px, r.py);
        }
        Ok(())
    }

    /// Pop the save point and flush.
    pub(crate) fn end<G: GraphicsBackend>(&mut self, gfx: &mut G, target: &mut G::Surface) {
        gfx.restore(target);
        gfx.flush(target);
        self.flags = DirtyFlags::CLEAN;
    }

    pub(crate) fn delete<G: GraphicsBackend>(&mut self, _gfx: &mut G) {
        self.deleted = true;
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/container/canvas.rs"]
mod tests;
