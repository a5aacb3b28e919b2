use crate::style::color::ColorDescriptor;
use serde::{Deserialize, Serialize};

/// Horizontal alignment of paragraph lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
    Start,
    End,
}

impl<'de> Deserialize<'de> for TextAlign {
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

        let v = match Repr::deserialize(deserializer)? {
            Repr::Name(s) => match s.to_ascii_lowercase().as_str() {
                "left" => Self::Left,
                "right" => Self::Right,
                "center" => Self::Center,
                "justify" => Self::Justify,
                "start" => Self::Start,
                "end" => Self::End,
                _ => {
                    return Err(serde::de::Error::custom(format!(
                        "unknown text align \"{s}\""
                    )));
                }
            },
            Repr::Native(0) => Self::Left,
            Repr::Native(1) => Self::Right,
            Repr::Native(2) => Self::Center,
            Repr::Native(3) => Self::Justify,
            Repr::Native(4) => Self::Start,
            Repr::Native(5) => Self::End,
            Repr::Native(n) => {
                return Err(serde::de::Error::custom(format!(
                    "text align {n} is out of range"
                )));
            }
        };
        Ok(v)
    }
}

/// Character styling shared by every run of a paragraph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Glyph color.
    pub color: ColorDescriptor,
    /// Font family fallback chain, most preferred first.
    pub font_families: Vec<String>,
    /// Font size in pixels.
    pub font_size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: ColorDescriptor::css("black"),
            font_families: vec!["Roboto".to_owned(), "Noto Color Emoji".to_owned()],
            font_size: 50.0,
        }
    }
}

/// Paragraph-level styling, as passed in a `paragraphStyle` prop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParagraphStyle {
    /// Character styling.
    pub text_style: TextStyle,
    /// Line alignment.
    pub text_align: TextAlign,
    /// Maximum number of lines kept after layout.
    pub max_lines: Option<usize>,
    /// Marker drawn when lines are truncated.
    pub ellipsis: Option<String>,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            text_style: TextStyle::default(),
            text_align: TextAlign::Left,
            max_lines: Some(7),
            ellipsis: Some("...".to_owned()),
        }
    }
}
