use crate::foundation::error::SkeneResult;
use crate::render::backend::PaintHandle;
use crate::style::color::{ColorDescriptor, parse_color_string, resolve_color};
use serde::{Deserialize, Serialize};

/// Fill or stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMode {
    /// Fill the interior of the geometry.
    #[default]
    Fill,
    /// Stroke the outline of the geometry.
    Stroke,
}

impl<'de> Deserialize<'de> for PaintMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Token(String),
            Native(u32),
        }

        match Repr::deserialize(deserializer)? {
            // Anything that is not "stroke" falls back to fill.
            Repr::Token(s) if s.eq_ignore_ascii_case("stroke") => Ok(Self::Stroke),
            Repr::Token(_) => Ok(Self::Fill),
            Repr::Native(0) => Ok(Self::Fill),
            Repr::Native(1) => Ok(Self::Stroke),
            Repr::Native(n) => Err(serde::de::Error::custom(format!(
                "paint style enum value {n} is out of range"
            ))),
        }
    }
}

/// Porter-Duff and separable/non-separable blend modes, in native enum order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum BlendMode {
    Clear,
    Src,
    Dst,
    #[default]
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcATop,
    DstATop,
    Xor,
    Plus,
    Modulate,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    const ALL: [Self; 29] = [
        Self::Clear,
        Self::Src,
        Self::Dst,
        Self::SrcOver,
        Self::DstOver,
        Self::SrcIn,
        Self::DstIn,
        Self::SrcOut,
        Self::DstOut,
        Self::SrcATop,
        Self::DstATop,
        Self::Xor,
        Self::Plus,
        Self::Modulate,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Multiply,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// Look up a mode by its native enum value.
    pub fn from_native(v: u32) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    fn from_name(s: &str) -> Option<Self> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| format!("{m:?}").to_ascii_lowercase() == wanted)
    }
}

impl<'de> Deserialize<'de> for BlendMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Native(u32),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(s) => Self::from_name(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown blend mode \"{s}\""))),
            Repr::Native(n) => Self::from_native(n)
                .ok_or_else(|| serde::de::Error::custom(format!("blend mode {n} is out of range"))),
        }
    }
}

/// Declarative paint description, as passed in a `style` prop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaintStyle {
    /// Paint color.
    pub color: Option<ColorDescriptor>,
    /// Fill or stroke.
    pub style: Option<PaintMode>,
    /// Stroke miter limit.
    pub stroke_miter: Option<f32>,
    /// Stroke width.
    pub stroke_width: Option<f32>,
    /// Anti-aliasing.
    pub anti_alias: Option<bool>,
    /// Blend mode.
    pub blend_mode: Option<BlendMode>,
    /// Alpha multiplier applied after the color.
    pub alpha: Option<f32>,
}

impl PaintStyle {
    /// A style that only sets a color.
    pub fn color(color: impl Into<ColorDescriptor>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::default()
        }
    }
}

/// Mutate `paint` in place from a declarative style.
///
/// Zero stroke miter, stroke width and alpha, `antiAlias: false` and the `clear`
/// blend mode are all treated as "not provided" and leave the paint untouched.
/// Everything written here is a plain value set; repeated calls allocate nothing.
pub fn apply_paint_style<P: PaintHandle + ?Sized>(
    paint: &mut P,
    style: &PaintStyle,
) -> SkeneResult<()> {
    match &style.color {
        Some(ColorDescriptor::Css(s)) => {
            let s = if s.trim().is_empty() { "black" } else { s };
            paint.set_color(parse_color_string(s)?);
        }
        Some(other) => paint.set_color(resolve_color(other)?),
        None => {}
    }

    if let Some(mode) = style.style {
        paint.set_mode(mode);
    }
    if let Some(miter) = style.stroke_miter.filter(|v| *v != 0.0) {
        paint.set_stroke_miter(miter);
    }
    if let Some(width) = style.stroke_width.filter(|v| *v != 0.0) {
        paint.set_stroke_width(width);
    }
    if style.anti_alias == Some(true) {
        paint.set_anti_alias(true);
    }
    if let Some(blend) = style.blend_mode.filter(|b| *b != BlendMode::Clear) {
        paint.set_blend_mode(blend);
    }
    if let Some(alpha) = style.alpha.filter(|v| *v != 0.0) {
        paint.set_alpha(alpha);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/style/paint.rs"]
mod tests;
