use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::style_error::StyleError;

pub const MIN_FONT_SIZE: u32 = 16;
pub const MAX_FONT_SIZE: u32 = 60;

/// Characters that would split an ASS style record or escape the quoted
/// `force_style` option of the subtitles filter.
const FORBIDDEN_FONT_CHARS: &[char] = &[',', '\'', ':', '\\', '[', ']'];

/// A normalized 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Six uppercase hex digits in blue-green-red order, as ASS expects.
    pub fn to_ass_bgr(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.b, self.g, self.r)
    }
}

impl FromStr for Rgb {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StyleError::InvalidColor(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #RGB shorthand expands each digit: #F0A -> #FF00AA
            3 => {
                let expand = |i: usize| channel(hex[i..=i].repeat(2).as_str());
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Vertical placement of the subtitle block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Middle,
    #[default]
    Bottom,
}

impl VerticalAnchor {
    pub const ALL: &[VerticalAnchor] = &[
        VerticalAnchor::Top,
        VerticalAnchor::Middle,
        VerticalAnchor::Bottom,
    ];
}

impl FromStr for VerticalAnchor {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(VerticalAnchor::Top),
            "middle" => Ok(VerticalAnchor::Middle),
            "bottom" => Ok(VerticalAnchor::Bottom),
            _ => Err(StyleError::InvalidAnchor(s.to_string())),
        }
    }
}

impl fmt::Display for VerticalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerticalAnchor::Top => write!(f, "top"),
            VerticalAnchor::Middle => write!(f, "middle"),
            VerticalAnchor::Bottom => write!(f, "bottom"),
        }
    }
}

/// Visual style applied to burned-in subtitles.
///
/// Every field has a default so a style is always fully populated, also
/// when deserialized from a partial preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStyle {
    pub font_family: String,
    pub font_size_pt: u32,
    pub primary_color: Rgb,
    pub outline_color: Rgb,
    pub outline_width_px: f64,
    pub shadow_depth_px: f64,
    pub vertical_anchor: VerticalAnchor,
    pub margin_px: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_family: "TH Sarabun New".to_string(),
            font_size_pt: 28,
            primary_color: Rgb::WHITE,
            outline_color: Rgb::BLACK,
            outline_width_px: 3.0,
            shadow_depth_px: 3.0,
            vertical_anchor: VerticalAnchor::Bottom,
            margin_px: 40,
        }
    }
}

impl SubtitleStyle {
    pub fn validate(&self) -> Result<(), StyleError> {
        if self.font_family.trim().is_empty() {
            return Err(StyleError::EmptyFontFamily);
        }
        if self
            .font_family
            .chars()
            .any(|c| c.is_control() || FORBIDDEN_FONT_CHARS.contains(&c))
        {
            return Err(StyleError::InvalidFontFamily(self.font_family.clone()));
        }
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size_pt) {
            return Err(StyleError::FontSizeOutOfRange {
                value: self.font_size_pt,
                min: MIN_FONT_SIZE,
                max: MAX_FONT_SIZE,
            });
        }
        check_length("outline width", self.outline_width_px)?;
        check_length("shadow depth", self.shadow_depth_px)?;
        Ok(())
    }
}

fn check_length(field: &'static str, value: f64) -> Result<(), StyleError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(StyleError::NegativeLength { field, value })
    }
}
