use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported subtitle format '{extension}': expected srt, vtt or ass")]
pub struct UnsupportedSubtitleFormat {
    pub extension: String,
}

/// Timed-text formats the burn-in filter understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
}

impl SubtitleFormat {
    pub const ALL: &[SubtitleFormat] = &[SubtitleFormat::Srt, SubtitleFormat::Vtt, SubtitleFormat::Ass];

    pub fn from_extension(extension: &str) -> Result<Self, UnsupportedSubtitleFormat> {
        match extension.to_ascii_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" => Ok(SubtitleFormat::Vtt),
            "ass" => Ok(SubtitleFormat::Ass),
            _ => Err(UnsupportedSubtitleFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Ass => "ass",
        }
    }

    /// True for formats that carry their own style section.
    pub fn has_embedded_styles(&self) -> bool {
        matches!(self, SubtitleFormat::Ass)
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Subtitle file contents plus the format fixed at ingestion.
///
/// The format comes from the file extension only and is never re-derived
/// from the contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleAsset {
    file_name: String,
    format: SubtitleFormat,
    data: Vec<u8>,
}

impl SubtitleAsset {
    pub fn new(
        file_name: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, UnsupportedSubtitleFormat> {
        let file_name = file_name.into();
        // Text after the last dot, so a bare `.srt` still counts as SRT.
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("");
        let format = SubtitleFormat::from_extension(extension)?;
        Ok(Self {
            file_name,
            format,
            data,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> SubtitleFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
