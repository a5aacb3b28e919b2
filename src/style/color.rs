use crate::foundation::core::Color;
use crate::foundation::error::{SkeneError, SkeneResult};
use serde::{Deserialize, Serialize};

/// Declarative color description accepted by paint styles and canvas clears.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorDescriptor {
    /// CSS color string: hex, `rgb()/rgba()` or a named color.
    Css(String),
    /// `[r, g, b]` or `[r, g, b, a]` with 0..255 color channels and 0..1 alpha.
    Components(Vec<f64>),
    /// Already-normalized float buffer in RGBA order.
    Float([f32; 4]),
}

impl ColorDescriptor {
    /// Shorthand for a CSS color string.
    pub fn css(s: impl Into<String>) -> Self {
        Self::Css(s.into())
    }
}

impl From<Color> for ColorDescriptor {
    fn from(c: Color) -> Self {
        Self::Float([c.r, c.g, c.b, c.a])
    }
}

impl From<&str> for ColorDescriptor {
    fn from(s: &str) -> Self {
        Self::Css(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for ColorDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            Arr(Vec<f64>),
            RgbaObj {
                r: f32,
                g: f32,
                b: f32,
                #[serde(default = "one")]
                a: f32,
            },
        }

        fn one() -> f32 {
            1.0
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Css(s) => Self::Css(s),
            Repr::Arr(v) => Self::Components(v),
            Repr::RgbaObj { r, g, b, a } => Self::Float([r, g, b, a]),
        })
    }
}

/// Resolve a declarative color into a backend color.
pub fn resolve_color(desc: &ColorDescriptor) -> SkeneResult<Color> {
    match desc {
        ColorDescriptor::Css(s) => parse_color_string(s),
        ColorDescriptor::Components(v) => match v.as_slice() {
            [r, g, b] => Ok(from_components(*r, *g, *b, 1.0)),
            [r, g, b, a] => Ok(from_components(*r, *g, *b, *a)),
            _ => Err(SkeneError::validation(
                "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
            )),
        },
        ColorDescriptor::Float([r, g, b, a]) => Ok(Color::rgba(*r, *g, *b, *a)),
    }
}

fn from_components(r: f64, g: f64, b: f64, a: f64) -> Color {
    let ch = |x: f64| (x.clamp(0.0, 255.0) / 255.0) as f32;
    Color::rgba(ch(r), ch(g), ch(b), a.clamp(0.0, 1.0) as f32)
}

/// Parse a CSS color string.
pub fn parse_color_string(s: &str) -> SkeneResult<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_fn(args);
    }
    named_color(&lower).ok_or_else(|| SkeneError::validation(format!("unknown color \"{s}\"")))
}

fn parse_hex(s: &str) -> SkeneResult<Color> {
    fn nibble(c: u8) -> SkeneResult<u8> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| SkeneError::validation(format!("invalid hex digit '{}'", c as char)))
    }

    let b = s.as_bytes();
    let expand = |i: usize| -> SkeneResult<u8> { Ok(nibble(b[i])? * 17) };
    let pair = |i: usize| -> SkeneResult<u8> { Ok(nibble(b[i])? * 16 + nibble(b[i + 1])?) };

    let (r, g, bl, a) = match b.len() {
        3 => (expand(0)?, expand(1)?, expand(2)?, 255),
        4 => (expand(0)?, expand(1)?, expand(2)?, expand(3)?),
        6 => (pair(0)?, pair(2)?, pair(4)?, 255),
        8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
        _ => {
            return Err(SkeneError::validation(
                "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA",
            ));
        }
    };
    Ok(Color::from_rgba8(r, g, bl, a))
}

fn parse_rgb_fn(args: &str) -> SkeneResult<Color> {
    let parts = args
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| SkeneError::validation(format!("invalid rgb() component \"{p}\"")))
        })
        .collect::<SkeneResult<Vec<_>>>()?;
    resolve_color(&ColorDescriptor::Components(parts))
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "darkgray" | "darkgrey" => [169, 169, 169],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        "orange" => [255, 165, 0],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        "gold" => [255, 215, 0],
        "indigo" => [75, 0, 130],
        "violet" => [238, 130, 238],
        "coral" => [255, 127, 80],
        "salmon" => [250, 128, 114],
        "tomato" => [255, 99, 71],
        "crimson" => [220, 20, 60],
        "orchid" => [218, 112, 214],
        "skyblue" => [135, 206, 235],
        "steelblue" => [70, 130, 180],
        "royalblue" => [65, 105, 225],
        "dodgerblue" => [30, 144, 255],
        "deepskyblue" => [0, 191, 255],
        "slategray" | "slategrey" => [112, 128, 144],
        "forestgreen" => [34, 139, 34],
        "seagreen" => [46, 139, 87],
        "limegreen" => [50, 205, 50],
        "turquoise" => [64, 224, 208],
        "khaki" => [240, 230, 140],
        "beige" => [245, 245, 220],
        "ivory" => [255, 255, 240],
        "whitesmoke" => [245, 245, 245],
        "hotpink" => [255, 105, 180],
        "rebeccapurple" => [102, 51, 153],
        _ => return None,
    };
    Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
