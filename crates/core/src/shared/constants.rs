/// The single supported container for both input and output.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";

/// Prefix added to the original video file name for the delivered artifact.
pub const OUTPUT_NAME_PREFIX: &str = "burned_";

// Well-known names inside a job's staging namespace.
pub const STAGED_INPUT_NAME: &str = "input.mp4";
pub const STAGED_OUTPUT_NAME: &str = "output.mp4";
pub const STAGED_PROBE_NAME: &str = "probe.mp4";
pub const STAGED_SUBTITLE_STEM: &str = "sub";

/// Filter argument used when there is no filter graph to apply.
pub const NULL_FILTER: &str = "null";

pub const VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_CRF: u32 = 18;
pub const ENCODER_PRESET: &str = "fast";
pub const AUDIO_CODEC: &str = "copy";

/// Environment variable that overrides ffmpeg discovery on PATH.
pub const FFMPEG_ENV_VAR: &str = "HARDSUB_FFMPEG";
pub const FFMPEG_BINARY_NAME: &str = "ffmpeg";
