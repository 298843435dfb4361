use core::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ARGB color, serialized as `#AARRGGBB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    pub const fn white() -> Self {
        Self { argb: 0xFFFFFFFF }
    }

    /// The `0xRRGGBB` part, alpha dropped.
    pub const fn rgb(self) -> u32 {
        self.argb & 0x00FF_FFFF
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.argb)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| D::Error::custom("color must be a #AARRGGBB hex string (missing '#')"))?;
        if hex.len() != 8 {
            return Err(D::Error::custom(
                "color must be a #AARRGGBB hex string (8 hex digits)",
            ));
        }
        let argb = u32::from_str_radix(hex, 16).map_err(|_| D::Error::custom("invalid hex"))?;
        Ok(Color { argb })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Font {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Font size in 1/100 points (e.g. 1100 = 11pt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_100pt: Option<u16>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Font {
    fn merged_with(&self, overlay: &Font) -> Font {
        Font {
            name: overlay.name.clone().or_else(|| self.name.clone()),
            size_100pt: overlay.size_100pt.or(self.size_100pt),
            bold: self.bold || overlay.bold,
            italic: self.italic || overlay.italic,
            color: overlay.color.or(self.color),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Fill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Border {
    #[serde(default)]
    pub top: BorderStyle,
    #[serde(default)]
    pub bottom: BorderStyle,
    #[serde(default)]
    pub left: BorderStyle,
    #[serde(default)]
    pub right: BorderStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Alignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub wrap_text: bool,
}

impl Alignment {
    fn merged_with(&self, overlay: &Alignment) -> Alignment {
        Alignment {
            horizontal: overlay.horizontal.or(self.horizontal),
            vertical: overlay.vertical.or(self.vertical),
            wrap_text: self.wrap_text || overlay.wrap_text,
        }
    }
}

/// Cell style. Every section is optional so styles can be layered: a range
/// style provides defaults and each cell may override parts of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl Style {
    pub fn is_default(&self) -> bool {
        *self == Style::default()
    }

    /// Layer `overlay` on top of `self`.
    ///
    /// Font and alignment merge field by field; fill, border and number format
    /// are replaced whole when the overlay sets them.
    #[must_use]
    pub fn merged_with(&self, overlay: Option<&Style>) -> Style {
        let Some(overlay) = overlay else {
            return self.clone();
        };
        Style {
            font: merge_section(&self.font, &overlay.font, Font::merged_with),
            fill: overlay.fill.clone().or_else(|| self.fill.clone()),
            border: overlay.border.clone().or_else(|| self.border.clone()),
            alignment: merge_section(&self.alignment, &overlay.alignment, Alignment::merged_with),
            number_format: overlay
                .number_format
                .clone()
                .or_else(|| self.number_format.clone()),
        }
    }
}

fn merge_section<T: Clone>(base: &Option<T>, overlay: &Option<T>, merge: fn(&T, &T) -> T) -> Option<T> {
    match (base, overlay) {
        (Some(base), Some(overlay)) => Some(merge(base, overlay)),
        (None, Some(overlay)) => Some(overlay.clone()),
        (base, None) => base.clone(),
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
