use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("invalid color '{0}': expected 3 or 6 hex digits, optionally prefixed with '#'")]
    InvalidColor(String),
    #[error("font size must be between {min} and {max}, got {value}")]
    FontSizeOutOfRange { value: u32, min: u32, max: u32 },
    #[error("{field} must be a finite number >= 0, got {value}")]
    NegativeLength { field: &'static str, value: f64 },
    #[error("font family must not be empty")]
    EmptyFontFamily,
    #[error("font family '{0}' contains a character that cannot be embedded in a style record")]
    InvalidFontFamily(String),
    #[error("unknown position '{0}': expected top, middle or bottom")]
    InvalidAnchor(String),
    #[error("invalid frame rate '{0}': expected auto, an integer, a decimal or N/D")]
    InvalidFrameRate(String),
}
