use crate::foundation::error::{SkeneError, SkeneResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Straight-alpha RGBA color with normalized `0..=1` channels.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Construct from normalized channels.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Construct from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Return a copy with the alpha channel replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Quantize to straight-alpha 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f32) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

/// Rounded rectangle geometry with elliptical corners.
///
/// This is a plain value; building one allocates nothing in the backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RRect {
    /// Outer bounds.
    pub rect: Rect,
    /// Horizontal corner radius.
    pub rx: f64,
    /// Vertical corner radius.
    pub ry: f64,
}

impl RRect {
    /// Build from bounds and corner radii. Radii are clamped to half the rect size.
    pub fn new(rect: Rect, rx: f64, ry: f64) -> Self {
        let rect = rect.abs();
        let rx = rx.max(0.0).min(rect.width() / 2.0);
        let ry = ry.max(0.0).min(rect.height() / 2.0);
        Self { rect, rx, ry }
    }

    /// Outer bounds.
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    /// Return `true` when either radius is zero.
    pub fn is_rect(&self) -> bool {
        self.rx == 0.0 || self.ry == 0.0
    }

    /// Outline as a closed path; corners are cubic quarter-ellipses.
    pub fn to_path(&self) -> BezPath {
        const KAPPA: f64 = 0.552_284_749_831;
        let Rect { x0, y0, x1, y1 } = self.rect;
        let mut p = BezPath::new();
        if self.is_rect() {
            p.move_to((x0, y0));
            p.line_to((x1, y0));
            p.line_to((x1, y1));
            p.line_to((x0, y1));
            p.close_path();
            return p;
        }
        let (rx, ry) = (self.rx, self.ry);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        p.move_to((x0 + rx, y0));
        p.line_to((x1 - rx, y0));
        p.curve_to((x1 - rx + kx, y0), (x1, y0 + ry - ky), (x1, y0 + ry));
        p.line_to((x1, y1 - ry));
        p.curve_to((x1, y1 - ry + ky), (x1 - rx + kx, y1), (x1 - rx, y1));
        p.line_to((x0 + rx, y1));
        p.curve_to((x0 + rx - kx, y1), (x0, y1 - ry + ky), (x0, y1 - ry));
        p.line_to((x0, y0 + ry));
        p.curve_to((x0, y0 + ry - ky), (x0 + rx - kx, y0), (x0 + rx, y0));
        p.close_path();
        p
    }
}

/// One path construction command.
///
/// The JSON form is a flat numeric array led by a verb:
/// `[0, x, y]` move, `[1, x, y]` line, `[2, x1, y1, x2, y2]` quad,
/// `[3, x1, y1, x2, y2, w]` conic, `[4, x1, y1, x2, y2, x3, y3]` cubic, `[5]` close.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    /// Start a new contour.
    MoveTo(Point),
    /// Straight segment.
    LineTo(Point),
    /// Quadratic Bézier segment.
    QuadTo(Point, Point),
    /// Conic segment with weight.
    ConicTo(Point, Point, f64),
    /// Cubic Bézier segment.
    CubicTo(Point, Point, Point),
    /// Close the current contour.
    Close,
}

impl PathCmd {
    /// Decode one command from its verb-prefixed numeric form.
    pub fn from_verbs(v: &[f64]) -> SkeneResult<Self> {
        let Some((&verb, args)) = v.split_first() else {
            return Err(SkeneError::validation("path command must not be empty"));
        };
        let need = |n: usize| -> SkeneResult<()> {
            if args.len() == n {
                Ok(())
            } else {
                Err(SkeneError::validation(format!(
                    "path verb {verb} expects {n} coordinates, got {}",
                    args.len()
                )))
            }
        };
        let pt = |i: usize| Point::new(args[i], args[i + 1]);
        match verb as i64 {
            0 => {
                need(2)?;
                Ok(Self::MoveTo(pt(0)))
            }
            1 => {
                need(2)?;
                Ok(Self::LineTo(pt(0)))
            }
            2 => {
                need(4)?;
                Ok(Self::QuadTo(pt(0), pt(2)))
            }
            3 => {
                need(5)?;
                Ok(Self::ConicTo(pt(0), pt(2), args[4]))
            }
            4 => {
                need(6)?;
                Ok(Self::CubicTo(pt(0), pt(2), pt(4)))
            }
            5 => {
                need(0)?;
                Ok(Self::Close)
            }
            _ => Err(SkeneError::validation(format!("unknown path verb {verb}"))),
        }
    }
}

impl<'de> serde::Deserialize<'de> for PathCmd {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<f64>::deserialize(deserializer)?;
        Self::from_verbs(&raw).map_err(serde::de::Error::custom)
    }
}

/// Build a kurbo path from commands.
///
/// Conics are approximated by a quadratic through the same control point. Every contour
/// must open with a move.
pub fn bezpath_from_cmds(cmds: &[PathCmd]) -> SkeneResult<BezPath> {
    let mut p = BezPath::new();
    let mut open = false;
    for cmd in cmds {
        if !open && !matches!(cmd, PathCmd::MoveTo(_) | PathCmd::Close) {
            return Err(SkeneError::validation(
                "path segment without a preceding move command",
            ));
        }
        match *cmd {
            PathCmd::MoveTo(a) => {
                p.move_to(a);
                open = true;
            }
            PathCmd::LineTo(a) => p.line_to(a),
            PathCmd::QuadTo(a, b) => p.quad_to(a, b),
            PathCmd::ConicTo(a, b, _w) => p.quad_to(a, b),
            PathCmd::CubicTo(a, b, c) => p.curve_to(a, b, c),
            PathCmd::Close => {
                if open {
                    p.close_path();
                }
                open = false;
            }
        }
    }
    Ok(p)
}

/// Opaque key identifying a mounted render target.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TargetId(pub u64);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
