use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::job::JobId;
use crate::engine::domain::staging_area::StagingArea;
use crate::engine::domain::transcode_engine::{EngineError, TranscodeEngine};
use crate::shared::constants::STAGED_PROBE_NAME;
use crate::video::domain::video_asset::{DetectedFrameRate, VideoAsset};

static FPS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r", ([\d.]+) fps").expect("valid fps pattern"));

/// Detection could not produce a rate. Callers fall back to the source rate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("frame rate probe failed: {reason}")]
pub struct ProbeFailed {
    pub reason: String,
}

/// Reads a video's frame rate from the engine's stream description.
///
/// The video is staged under a job-scoped name, decoded once with all
/// output discarded, and removed again whatever the outcome. A successful
/// result is cached on the asset, so later calls do not probe again.
pub struct DetectFrameRateUseCase<'a> {
    engine: &'a mut dyn TranscodeEngine,
}

impl<'a> DetectFrameRateUseCase<'a> {
    pub fn new(engine: &'a mut dyn TranscodeEngine) -> Self {
        Self { engine }
    }

    pub fn execute(&mut self, video: &mut VideoAsset) -> Result<DetectedFrameRate, ProbeFailed> {
        if let Some(rate) = video.detected_frame_rate() {
            return Ok(rate);
        }

        let rate = self.probe(video.data())?;
        log::info!("Detected {rate} fps for {}", video.file_name());
        video.set_detected_frame_rate(rate);
        Ok(rate)
    }

    fn probe(&mut self, data: &[u8]) -> Result<DetectedFrameRate, ProbeFailed> {
        let mut area =
            StagingArea::open(&mut *self.engine, JobId::next().namespace()).map_err(failed)?;
        let probe_path = area.stage(STAGED_PROBE_NAME, data).map_err(failed)?;
        let args = probe_args(&probe_path);
        log::debug!("Probe: {}", args.join(" "));

        area.run(&args, &mut |_| {}).map_err(failed)?;
        parse_frame_rate(area.log()).ok_or_else(|| ProbeFailed {
            reason: "no frame rate in stream description".to_string(),
        })
    }
}

/// Decode-only pass: every frame is discarded, only the log is of interest.
pub fn probe_args(input: &str) -> Vec<String> {
    ["-i", input, "-f", "null", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// First `, <n> fps` field of an engine log, rounded to three decimals.
pub fn parse_frame_rate(log: &str) -> Option<DetectedFrameRate> {
    let fps: f64 = FPS_PATTERN.captures(log)?.get(1)?.as_str().parse().ok()?;
    (fps.is_finite() && fps > 0.0).then(|| DetectedFrameRate::from_fps(fps))
}

fn failed(error: EngineError) -> ProbeFailed {
    let reason = match &error {
        EngineError::Failed { log, .. } | EngineError::Terminated { log } => {
            last_line(log).unwrap_or_else(|| error.to_string())
        }
        other => other.to_string(),
    };
    ProbeFailed { reason }
}

fn last_line(log: &str) -> Option<String> {
    log.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}
