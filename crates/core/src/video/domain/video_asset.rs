use std::fmt;

use crate::shared::constants::OUTPUT_NAME_PREFIX;

/// Frame rate reported by the engine for a source video, rounded to three
/// decimal places.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectedFrameRate(f64);

impl DetectedFrameRate {
    pub fn from_fps(fps: f64) -> Self {
        Self((fps * 1000.0).round() / 1000.0)
    }

    pub fn fps(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for DetectedFrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Source video bytes with the frame rate cached once detected.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoAsset {
    file_name: String,
    data: Vec<u8>,
    detected_frame_rate: Option<DetectedFrameRate>,
}

impl VideoAsset {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
            detected_frame_rate: None,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `None` until detection succeeds.
    pub fn detected_frame_rate(&self) -> Option<DetectedFrameRate> {
        self.detected_frame_rate
    }

    pub fn set_detected_frame_rate(&mut self, rate: DetectedFrameRate) {
        self.detected_frame_rate = Some(rate);
    }

    /// Name of the rendered artifact delivered for this video.
    pub fn output_file_name(&self) -> String {
        format!("{OUTPUT_NAME_PREFIX}{}", self.file_name)
    }
}
