use super::job::{JobState, PipelineJob};
use super::pipeline_error::PipelineError;
use super::pipeline_logger::{PercentClamp, PipelineLogger};
use crate::delivery::domain::artifact_sink::{ArtifactSink, VideoArtifact};
use crate::engine::domain::staging_area::StagingArea;
use crate::engine::domain::transcode_engine::{EngineError, TranscodeEngine};
use crate::filter::domain::filter_graph::{self, FilterExpression, StagedSubtitle};
use crate::shared::constants::{
    AUDIO_CODEC, DEFAULT_CRF, ENCODER_PRESET, STAGED_INPUT_NAME, STAGED_OUTPUT_NAME,
    STAGED_SUBTITLE_STEM, VIDEO_CODEC,
};
use crate::style::domain::style_translator::translate;

/// Subtitle burn-in pipeline: stage → encode → collect → deliver.
///
/// Runs one job at a time against the engine. Every working file the job
/// creates is removed when the run ends, on success and on every failure.
pub struct BurnSubtitlesUseCase<'a> {
    engine: &'a mut dyn TranscodeEngine,
    sink: &'a mut dyn ArtifactSink,
}

impl<'a> BurnSubtitlesUseCase<'a> {
    pub fn new(engine: &'a mut dyn TranscodeEngine, sink: &'a mut dyn ArtifactSink) -> Self {
        Self { engine, sink }
    }

    /// Runs the job to `Done` or `Failed`, reporting each transition.
    pub fn execute(
        &mut self,
        job: &PipelineJob,
        logger: &mut dyn PipelineLogger,
    ) -> Result<VideoArtifact, PipelineError> {
        let result = self.run_phases(job, logger);
        match &result {
            Ok(artifact) => {
                logger.state(job.id, JobState::Done);
                logger.info(&format!(
                    "Job {}: delivered {} ({} bytes)",
                    job.id,
                    artifact.file_name,
                    artifact.data.len()
                ));
            }
            Err(e) => {
                logger.state(job.id, JobState::Failed);
                log::debug!("Job {} failed: {e}", job.id);
            }
        }
        result
    }

    fn run_phases(
        &mut self,
        job: &PipelineJob,
        logger: &mut dyn PipelineLogger,
    ) -> Result<VideoArtifact, PipelineError> {
        let id = job.id;
        job.style.validate()?;

        logger.state(id, JobState::Staging);
        let mut area = StagingArea::open(&mut *self.engine, id.namespace()).map_err(|source| {
            PipelineError::StagingIo {
                name: "transcode engine".to_string(),
                source,
            }
        })?;
        let input = area
            .stage(STAGED_INPUT_NAME, job.video.data())
            .map_err(|source| PipelineError::StagingIo {
                name: job.video.file_name().to_string(),
                source,
            })?;
        let staged_subtitle = match &job.subtitle {
            Some(subtitle) => {
                let name = format!("{STAGED_SUBTITLE_STEM}.{}", subtitle.format().extension());
                let path = area.stage(&name, subtitle.data()).map_err(|source| {
                    PipelineError::StagingIo {
                        name: subtitle.file_name().to_string(),
                        source,
                    }
                })?;
                Some(StagedSubtitle::new(path, subtitle.format()))
            }
            None => None,
        };
        let output = area.reserve(STAGED_OUTPUT_NAME);

        let translated = translate(&job.style);
        let filter = filter_graph::build(
            staged_subtitle.as_ref(),
            &job.style,
            job.frame_rate,
            &translated,
        );
        if filter.is_empty() {
            log::info!("Job {id}: no subtitle or rate change, re-encoding only");
        }
        let args = transcode_args(&input, &filter, &output);
        log::debug!("Job {id}: ffmpeg {}", args.join(" "));

        logger.state(id, JobState::Running);
        let mut clamp = PercentClamp::new();
        area.run(&args, &mut |ratio| logger.progress(id, clamp.apply(ratio)))
            .map_err(|e| PipelineError::EngineInvocation {
                diagnostic: diagnostic_of(e),
            })?;

        logger.state(id, JobState::Finalizing);
        let data = match area.read(&output) {
            Ok(data) => data,
            Err(EngineError::NotFound { .. }) => Vec::new(),
            Err(source) => {
                return Err(PipelineError::StagingIo {
                    name: output,
                    source,
                })
            }
        };
        if data.is_empty() {
            return Err(PipelineError::EmptyOutput { name: output });
        }

        let artifact = VideoArtifact::new(job.video.output_file_name(), data);
        self.sink
            .deliver(&artifact)
            .map_err(|source| PipelineError::Delivery { source })?;
        Ok(artifact)
    }
}

/// Fixed encode template. `-vf` is always present, as `null` when empty.
pub fn transcode_args(input: &str, filter: &FilterExpression, output: &str) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string(),
        "-vf".to_string(),
        filter.to_arg(),
        "-c:v".to_string(),
        VIDEO_CODEC.to_string(),
        "-crf".to_string(),
        DEFAULT_CRF.to_string(),
        "-preset".to_string(),
        ENCODER_PRESET.to_string(),
        "-c:a".to_string(),
        AUDIO_CODEC.to_string(),
        output.to_string(),
    ]
}

fn diagnostic_of(error: EngineError) -> String {
    match error {
        EngineError::Failed { log, .. } => log,
        EngineError::Terminated { log } => format!("terminated by signal\n{log}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake_engine::{FakeEngine, STREAM_LOG_24FPS};
    use crate::pipeline::detect_frame_rate_use_case::DetectFrameRateUseCase;
    use crate::pipeline::job::JobId;
    use crate::style::domain::frame_rate::FrameRatePreference;
    use crate::style::domain::subtitle_style::{Rgb, SubtitleStyle, VerticalAnchor};
    use crate::video::domain::video_asset::VideoAsset;

    // --- Stubs ---

    #[derive(Default)]
    struct RecordingLogger {
        states: Vec<JobState>,
        percents: Vec<u8>,
        jobs: Vec<JobId>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, job: JobId, percent: u8) {
            self.jobs.push(job);
            self.percents.push(percent);
        }

        fn state(&mut self, job: JobId, state: JobState) {
            self.jobs.push(job);
            self.states.push(state);
        }

        fn info(&mut self, _message: &str) {}
    }

    #[derive(Default)]
    struct MemorySink {
        delivered: Vec<VideoArtifact>,
        fail: bool,
    }

    impl ArtifactSink for MemorySink {
        fn deliver(&mut self, artifact: &VideoArtifact) -> std::io::Result<()> {
            if self.fail {
                return Err(std::io::Error::other("read-only destination"));
            }
            self.delivered.push(artifact.clone());
            Ok(())
        }
    }

    // --- Helpers ---

    fn clip() -> VideoAsset {
        VideoAsset::new("clip.mp4", b"source video".to_vec())
    }

    fn arial_style() -> SubtitleStyle {
        SubtitleStyle {
            font_family: "Arial".to_string(),
            font_size_pt: 28,
            primary_color: Rgb::WHITE,
            outline_color: Rgb::BLACK,
            outline_width_px: 3.0,
            shadow_depth_px: 3.0,
            vertical_anchor: VerticalAnchor::Bottom,
            margin_px: 40,
        }
    }

    struct Outcome {
        result: Result<VideoArtifact, PipelineError>,
        engine: FakeEngine,
        sink: MemorySink,
        logger: RecordingLogger,
    }

    fn run_job(job: &PipelineJob, mut engine: FakeEngine, mut sink: MemorySink) -> Outcome {
        let mut logger = RecordingLogger::default();
        let result = BurnSubtitlesUseCase::new(&mut engine, &mut sink).execute(job, &mut logger);
        Outcome {
            result,
            engine,
            sink,
            logger,
        }
    }

    fn filter_arg(engine: &FakeEngine) -> &str {
        let args = &engine.runs[0];
        let at = args.iter().position(|a| a == "-vf").unwrap();
        &args[at + 1]
    }

    // --- Tests ---

    #[test]
    fn test_plain_reencode_uses_fixed_template() {
        let job = PipelineJob::new(clip());
        let ns = job.id.namespace();
        let out = run_job(&job, FakeEngine::new(), MemorySink::default());

        let artifact = out.result.unwrap();
        assert_eq!(
            out.engine.runs[0],
            vec![
                "-i".to_string(),
                format!("{ns}input.mp4"),
                "-vf".to_string(),
                "null".to_string(),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-crf".to_string(),
                "18".to_string(),
                "-preset".to_string(),
                "fast".to_string(),
                "-c:a".to_string(),
                "copy".to_string(),
                format!("{ns}output.mp4"),
            ]
        );
        assert_eq!(artifact.file_name, "burned_clip.mp4");
        assert_eq!(artifact.mime_type, "video/mp4");
        assert_eq!(artifact.data, b"rendered video");
        assert_eq!(out.sink.delivered, vec![artifact]);
    }

    #[test]
    fn test_states_follow_lifecycle() {
        let job = PipelineJob::new(clip());
        let out = run_job(&job, FakeEngine::new(), MemorySink::default());

        assert_eq!(
            out.logger.states,
            vec![
                JobState::Staging,
                JobState::Running,
                JobState::Finalizing,
                JobState::Done
            ]
        );
        assert!(out.logger.jobs.iter().all(|id| *id == job.id));
    }

    #[test]
    fn test_srt_gets_inline_override() {
        let job = PipelineJob::new(clip())
            .with_subtitle_file("talk.srt", b"1\n00:00:01,000 --> 00:00:02,000\nHi\n".to_vec())
            .unwrap()
            .with_style(arial_style());
        let ns = job.id.namespace();
        let out = run_job(&job, FakeEngine::new(), MemorySink::default());

        out.result.unwrap();
        let vf = filter_arg(&out.engine);
        assert!(vf.starts_with(&format!("subtitles={ns}sub.srt:force_style='")));
        for field in ["FontSize=28", "PrimaryColour=&HFFFFFF", "Alignment=2", "MarginV=40"] {
            assert!(vf.contains(field), "{field} missing from {vf}");
        }
    }

    #[test]
    fn test_ass_forces_margin_only() {
        let job = PipelineJob::new(clip())
            .with_subtitle_file("styled.ASS", b"[Script Info]\n".to_vec())
            .unwrap()
            .with_style(arial_style());
        let ns = job.id.namespace();
        let out = run_job(&job, FakeEngine::new(), MemorySink::default());

        out.result.unwrap();
        assert_eq!(
            filter_arg(&out.engine),
            format!("subtitles={ns}sub.ass:force_style='MarginV=40'")
        );
    }

    #[test]
    fn test_fixed_rate_precedes_subtitles() {
        let job = PipelineJob::new(clip())
            .with_subtitle_file("talk.vtt", b"WEBVTT\n".to_vec())
            .unwrap()
            .with_frame_rate("23.976".parse().unwrap());
        let out = run_job(&job, FakeEngine::new(), MemorySink::default());

        out.result.unwrap();
        assert!(filter_arg(&out.engine).starts_with("fps=24000/1001,subtitles="));
    }

    #[test]
    fn test_failed_probe_still_reaches_running() {
        let mut engine = FakeEngine::new();
        let mut video = VideoAsset::new("empty.mp4", Vec::new());
        assert!(DetectFrameRateUseCase::new(&mut engine)
            .execute(&mut video)
            .is_err());

        let job = PipelineJob::new(video).with_frame_rate(FrameRatePreference::Auto);
        let out = run_job(&job, engine, MemorySink::default());

        assert!(matches!(
            out.result,
            Err(PipelineError::EngineInvocation { .. })
        ));
        assert!(out.logger.states.contains(&JobState::Running));
        assert_eq!(out.logger.states.last(), Some(&JobState::Failed));
    }

    #[test]
    fn test_engine_diagnostic_is_carried_verbatim() {
        let mut engine = FakeEngine::new();
        engine.fail_run = Some("Error opening filters!".to_string());
        let out = run_job(&PipelineJob::new(clip()), engine, MemorySink::default());

        match out.result {
            Err(PipelineError::EngineInvocation { diagnostic }) => {
                assert_eq!(diagnostic, format!("{STREAM_LOG_24FPS}Error opening filters!\n"));
            }
            other => panic!("expected EngineInvocation, got {other:?}"),
        }
        assert!(out.sink.delivered.is_empty());
    }

    #[test]
    fn test_zero_length_output_is_empty_output() {
        let mut engine = FakeEngine::new();
        engine.output = Vec::new();
        let job = PipelineJob::new(clip());
        let out = run_job(&job, engine, MemorySink::default());

        match out.result {
            Err(PipelineError::EmptyOutput { name }) => {
                assert_eq!(name, format!("{}output.mp4", job.id.namespace()));
            }
            other => panic!("expected EmptyOutput, got {other:?}"),
        }
        assert!(out.sink.delivered.is_empty());
    }

    #[test]
    fn test_delivery_failure() {
        let sink = MemorySink {
            fail: true,
            ..MemorySink::default()
        };
        let out = run_job(&PipelineJob::new(clip()), FakeEngine::new(), sink);
        assert!(matches!(out.result, Err(PipelineError::Delivery { .. })));
        assert_eq!(out.logger.states.last(), Some(&JobState::Failed));
    }

    #[test]
    fn test_staging_failure() {
        let mut engine = FakeEngine::new();
        engine.fail_writes_to = Some("sub.srt".to_string());
        let job = PipelineJob::new(clip())
            .with_subtitle_file("talk.srt", b"1\n".to_vec())
            .unwrap();
        let out = run_job(&job, engine, MemorySink::default());

        match out.result {
            Err(PipelineError::StagingIo { name, .. }) => assert_eq!(name, "talk.srt"),
            other => panic!("expected StagingIo, got {other:?}"),
        }
        assert!(out.engine.runs.is_empty());
    }

    #[test]
    fn test_invalid_style_fails_before_staging() {
        let style = SubtitleStyle {
            font_family: "Bad'Font".to_string(),
            ..SubtitleStyle::default()
        };
        let job = PipelineJob::new(clip()).with_style(style);
        let out = run_job(&job, FakeEngine::new(), MemorySink::default());

        assert!(matches!(out.result, Err(PipelineError::InvalidStyle(_))));
        assert_eq!(out.logger.states, vec![JobState::Failed]);
        assert!(out.engine.files.is_empty());
    }

    #[test]
    fn test_working_files_removed_on_every_path() {
        let succeed = FakeEngine::new();
        let mut fail_run = FakeEngine::new();
        fail_run.fail_run = Some("boom".to_string());
        let mut empty_output = FakeEngine::new();
        empty_output.output = Vec::new();
        let mut fail_write = FakeEngine::new();
        fail_write.fail_writes_to = Some("sub.srt".to_string());

        for engine in [succeed, fail_run, empty_output, fail_write] {
            let job = PipelineJob::new(clip())
                .with_subtitle_file("talk.srt", b"1\n".to_vec())
                .unwrap()
                .with_frame_rate("25".parse().unwrap());
            let out = run_job(&job, engine, MemorySink::default());
            assert!(
                out.engine.files.is_empty(),
                "leftover files: {:?}",
                out.engine.files.keys().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_progress_is_clamped_non_decreasing() {
        let mut engine = FakeEngine::new();
        engine.progress = vec![0.0, 0.6, 0.4, 1.0];
        let out = run_job(&PipelineJob::new(clip()), engine, MemorySink::default());

        out.result.unwrap();
        assert_eq!(out.logger.percents, vec![0, 60, 60, 100]);
    }

    #[test]
    fn test_consecutive_jobs_share_a_loaded_engine() {
        let mut engine = FakeEngine::new();
        let mut sink = MemorySink::default();
        let mut logger = RecordingLogger::default();
        {
            let mut use_case = BurnSubtitlesUseCase::new(&mut engine, &mut sink);
            use_case
                .execute(&PipelineJob::new(clip()), &mut logger)
                .unwrap();
            use_case
                .execute(&PipelineJob::new(clip()), &mut logger)
                .unwrap();
        }
        assert_eq!(engine.load_count, 1);
        assert_eq!(engine.runs.len(), 2);
        assert_ne!(engine.runs[0][1], engine.runs[1][1]);
        assert_eq!(sink.delivered.len(), 2);
    }
}
