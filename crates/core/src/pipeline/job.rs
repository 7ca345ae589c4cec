use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::pipeline_error::PipelineError;
use crate::style::domain::frame_rate::FrameRatePreference;
use crate::style::domain::subtitle_style::SubtitleStyle;
use crate::subtitle::domain::subtitle_asset::SubtitleAsset;
use crate::video::domain::video_asset::VideoAsset;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing job identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    pub fn next() -> Self {
        Self(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Prefix that keeps this job's working files apart from other jobs'.
    pub fn namespace(&self) -> String {
        format!("job-{}-", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Staging,
    Running,
    Finalizing,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Staging => "staging",
            JobState::Running => "running",
            JobState::Finalizing => "finalizing",
            JobState::Done => "done",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything one burn-in run needs. Built per user action and consumed by
/// a single run.
#[derive(Clone, Debug)]
pub struct PipelineJob {
    pub id: JobId,
    pub video: VideoAsset,
    pub subtitle: Option<SubtitleAsset>,
    pub style: SubtitleStyle,
    pub frame_rate: FrameRatePreference,
}

impl PipelineJob {
    pub fn new(video: VideoAsset) -> Self {
        Self {
            id: JobId::next(),
            video,
            subtitle: None,
            style: SubtitleStyle::default(),
            frame_rate: FrameRatePreference::Auto,
        }
    }

    pub fn with_subtitle(mut self, subtitle: SubtitleAsset) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    /// Ingests a subtitle file, rejecting extensions the filter cannot read.
    pub fn with_subtitle_file(
        self,
        file_name: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, PipelineError> {
        let subtitle = SubtitleAsset::new(file_name, data)?;
        Ok(self.with_subtitle(subtitle))
    }

    pub fn with_style(mut self, style: SubtitleStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: FrameRatePreference) -> Self {
        self.frame_rate = frame_rate;
        self
    }
}
