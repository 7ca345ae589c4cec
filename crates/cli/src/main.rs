use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use hardsub_core::delivery::infrastructure::file_artifact_sink::FileArtifactSink;
use hardsub_core::engine::infrastructure::ffmpeg_process_engine::FfmpegProcessEngine;
use hardsub_core::pipeline::burn_subtitles_use_case::BurnSubtitlesUseCase;
use hardsub_core::pipeline::detect_frame_rate_use_case::DetectFrameRateUseCase;
use hardsub_core::pipeline::job::{JobId, JobState, PipelineJob};
use hardsub_core::pipeline::pipeline_logger::{
    LogPipelineLogger, NullPipelineLogger, PipelineLogger,
};
use hardsub_core::shared::constants::{FFMPEG_ENV_VAR, VIDEO_EXTENSIONS};
use hardsub_core::style::domain::frame_rate::FrameRatePreference;
use hardsub_core::style::domain::style_translator::StyleSheet;
use hardsub_core::style::domain::subtitle_style::SubtitleStyle;
use hardsub_core::style::infrastructure::json_style_preset;
use hardsub_core::video::domain::video_asset::VideoAsset;

/// Burn subtitles permanently into videos.
#[derive(Parser)]
#[command(name = "hardsub", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a video with its subtitles drawn onto the frames.
    Burn(BurnArgs),
    /// Print the frame rate ffmpeg reports for a video.
    Probe(ProbeArgs),
    /// Print the ASS style section for a style, optionally saving it as a preset.
    Style(StyleArgs),
}

#[derive(Args)]
struct BurnArgs {
    /// Input video (.mp4).
    video: PathBuf,

    /// Subtitle file (.srt, .vtt or .ass). Without one the video is only re-encoded.
    subtitle: Option<PathBuf>,

    /// Output file or directory (default: burned_<video name> next to the input).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output frame rate: auto, an integer, a decimal or a fraction (e.g. 24000/1001).
    #[arg(long, default_value = "auto")]
    fps: String,

    /// Suppress the progress line and the run summary.
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    style: StyleFlags,

    #[command(flatten)]
    engine: EngineFlags,
}

#[derive(Args)]
struct ProbeArgs {
    /// Input video (.mp4).
    video: PathBuf,

    #[command(flatten)]
    engine: EngineFlags,
}

#[derive(Args)]
struct StyleArgs {
    #[command(flatten)]
    style: StyleFlags,

    /// Write the effective style to this JSON preset.
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Style options. Explicit flags override values from `--preset`.
#[derive(Args)]
struct StyleFlags {
    /// JSON style preset to start from.
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Font family (default: TH Sarabun New).
    #[arg(long)]
    font: Option<String>,

    /// Font size in points, 16-60 (default: 28).
    #[arg(long)]
    font_size: Option<u32>,

    /// Text color as #RRGGBB (default: #FFFFFF).
    #[arg(long)]
    color: Option<String>,

    /// Outline color as #RRGGBB (default: #000000).
    #[arg(long)]
    outline_color: Option<String>,

    /// Outline width in pixels (default: 3).
    #[arg(long)]
    outline_width: Option<f64>,

    /// Shadow depth in pixels (default: 3).
    #[arg(long)]
    shadow: Option<f64>,

    /// Vertical position: top, middle or bottom (default: bottom).
    #[arg(long)]
    position: Option<String>,

    /// Vertical margin in pixels (default: 40).
    #[arg(long)]
    margin: Option<u32>,
}

#[derive(Args)]
struct EngineFlags {
    /// Path to the ffmpeg executable (default: looked up on PATH).
    #[arg(long, env = FFMPEG_ENV_VAR)]
    ffmpeg: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("hardsub=info"))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Burn(args) => run_burn(args),
        Command::Probe(args) => run_probe(args),
        Command::Style(args) => run_style(args),
    }
}

fn run_burn(args: BurnArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_burn(&args)?;
    let style = args.style.resolve()?;
    let frame_rate: FrameRatePreference = args.fps.parse()?;

    let video = VideoAsset::new(file_name_of(&args.video)?, fs::read(&args.video)?);
    let mut job = PipelineJob::new(video)
        .with_style(style)
        .with_frame_rate(frame_rate);
    if let Some(subtitle) = &args.subtitle {
        job = job.with_subtitle_file(file_name_of(subtitle)?, fs::read(subtitle)?)?;
    }

    let mut engine = build_engine(&args.engine);
    match DetectFrameRateUseCase::new(&mut engine).execute(&mut job.video) {
        Ok(rate) => log::info!("Source frame rate: {rate} fps"),
        Err(e) => log::warn!("{e}; keeping the source frame rate"),
    }

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.video, &job.video));
    let mut sink = FileArtifactSink::new(destination);
    let mut logger: Box<dyn PipelineLogger> = if args.quiet {
        Box::new(NullPipelineLogger)
    } else {
        Box::new(TerminalPipelineLogger::new())
    };

    let result =
        BurnSubtitlesUseCase::new(&mut engine, &mut sink).execute(&job, logger.as_mut());
    logger.summary();
    result?;

    for path in sink.written() {
        log::info!("Output written to {}", path.display());
    }
    Ok(())
}

fn run_probe(args: ProbeArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_video(&args.video)?;
    let mut video = VideoAsset::new(file_name_of(&args.video)?, fs::read(&args.video)?);
    let mut engine = build_engine(&args.engine);

    let detected = DetectFrameRateUseCase::new(&mut engine).execute(&mut video);
    if let Some(binary) = engine.binary() {
        log::debug!("Probed with {}", binary.display());
    }
    match detected {
        Ok(rate) => println!("{rate}"),
        Err(e) => {
            log::warn!("{e}");
            println!("undetected");
        }
    }
    Ok(())
}

fn run_style(args: StyleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let style = args.style.resolve()?;
    print!("{}", StyleSheet::render(&style));
    if let Some(path) = &args.save {
        json_style_preset::save(path, &style)?;
    }
    Ok(())
}

impl StyleFlags {
    fn resolve(&self) -> Result<SubtitleStyle, Box<dyn std::error::Error>> {
        let mut style = match &self.preset {
            Some(path) => json_style_preset::load(path)?,
            None => SubtitleStyle::default(),
        };
        if let Some(font) = &self.font {
            style.font_family = font.clone();
        }
        if let Some(size) = self.font_size {
            style.font_size_pt = size;
        }
        if let Some(color) = &self.color {
            style.primary_color = color.parse()?;
        }
        if let Some(color) = &self.outline_color {
            style.outline_color = color.parse()?;
        }
        if let Some(width) = self.outline_width {
            style.outline_width_px = width;
        }
        if let Some(depth) = self.shadow {
            style.shadow_depth_px = depth;
        }
        if let Some(position) = &self.position {
            style.vertical_anchor = position.parse()?;
        }
        if let Some(margin) = self.margin {
            style.margin_px = margin;
        }
        style.validate()?;
        Ok(style)
    }
}

fn build_engine(flags: &EngineFlags) -> FfmpegProcessEngine {
    match &flags.ffmpeg {
        Some(path) => FfmpegProcessEngine::with_binary(path),
        None => FfmpegProcessEngine::new(),
    }
}

fn validate_burn(args: &BurnArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_video(&args.video)?;
    if let Some(subtitle) = &args.subtitle {
        if !subtitle.is_file() {
            return Err(format!("Subtitle file not found: {}", subtitle.display()).into());
        }
    }
    if let Some(output) = &args.output {
        if output == &args.video {
            return Err("Output must not overwrite the input video".into());
        }
    }
    Ok(())
}

fn validate_video(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    if !is_video(path) {
        return Err(format!(
            "Input must be one of: {}, got {}",
            VIDEO_EXTENSIONS.join(", "),
            path.display()
        )
        .into());
    }
    Ok(())
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn file_name_of(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Not a valid file name: {}", path.display()).into())
}

fn default_output(input: &Path, video: &VideoAsset) -> PathBuf {
    input.with_file_name(video.output_file_name())
}

/// Renders encode progress on a single terminal line and forwards
/// everything else to the `log` crate.
struct TerminalPipelineLogger {
    inner: LogPipelineLogger,
    line_open: bool,
}

impl TerminalPipelineLogger {
    fn new() -> Self {
        Self {
            inner: LogPipelineLogger::default(),
            line_open: false,
        }
    }
}

impl PipelineLogger for TerminalPipelineLogger {
    fn progress(&mut self, _job: JobId, percent: u8) {
        eprint!("\rBurning subtitles... {percent}%");
        self.line_open = true;
    }

    fn state(&mut self, job: JobId, state: JobState) {
        if self.line_open {
            eprintln!();
            self.line_open = false;
        }
        self.inner.state(job, state);
    }

    fn info(&mut self, message: &str) {
        self.inner.info(message);
    }

    fn summary(&self) {
        self.inner.summary();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn burn_args(args: &[&str]) -> BurnArgs {
        match parse(args).command {
            Command::Burn(burn) => burn,
            _ => panic!("expected burn"),
        }
    }

    #[test]
    fn test_burn_defaults() {
        let args = burn_args(&["hardsub", "burn", "clip.mp4"]);
        assert_eq!(args.video, PathBuf::from("clip.mp4"));
        assert!(args.subtitle.is_none());
        assert_eq!(args.fps, "auto");
        assert!(!args.quiet);
        assert_eq!(args.style.resolve().unwrap(), SubtitleStyle::default());
    }

    #[test]
    fn test_style_flags_override_defaults() {
        let args = burn_args(&[
            "hardsub",
            "burn",
            "clip.mp4",
            "talk.srt",
            "--font",
            "Arial",
            "--font-size",
            "32",
            "--color",
            "#FFFF00",
            "--position",
            "top",
            "--margin",
            "12",
        ]);
        let style = args.style.resolve().unwrap();
        assert_eq!(style.font_family, "Arial");
        assert_eq!(style.font_size_pt, 32);
        assert_eq!(style.primary_color.to_string(), "#FFFF00");
        assert_eq!(style.vertical_anchor.to_string(), "top");
        assert_eq!(style.margin_px, 12);
    }

    #[test]
    fn test_flags_override_preset() {
        let dir = TempDir::new().unwrap();
        let preset = dir.path().join("preset.json");
        fs::write(&preset, r#"{"font_family": "Arial", "font_size_pt": 40}"#).unwrap();
        let preset_arg = preset.to_str().unwrap();

        let args = burn_args(&[
            "hardsub",
            "burn",
            "clip.mp4",
            "--preset",
            preset_arg,
            "--font-size",
            "20",
        ]);
        let style = args.style.resolve().unwrap();
        assert_eq!(style.font_family, "Arial");
        assert_eq!(style.font_size_pt, 20);
        assert_eq!(style.margin_px, 40);
    }

    #[test]
    fn test_quiet_flag() {
        let args = burn_args(&["hardsub", "burn", "clip.mp4", "-q"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_out_of_range_font_size_rejected() {
        let args = burn_args(&["hardsub", "burn", "clip.mp4", "--font-size", "100"]);
        assert!(args.style.resolve().is_err());
    }

    #[test]
    fn test_bad_color_rejected() {
        let args = burn_args(&["hardsub", "burn", "clip.mp4", "--color", "yellow"]);
        assert!(args.style.resolve().is_err());
    }

    #[test]
    fn test_validate_requires_existing_mp4() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(validate_video(&missing).is_err());

        let mov = dir.path().join("clip.mov");
        fs::write(&mov, b"x").unwrap();
        assert!(validate_video(&mov).is_err());

        let mp4 = dir.path().join("clip.MP4");
        fs::write(&mp4, b"x").unwrap();
        assert!(validate_video(&mp4).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_subtitle() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("clip.mp4");
        fs::write(&video, b"x").unwrap();
        let subtitle = dir.path().join("talk.srt");

        let args = burn_args(&[
            "hardsub",
            "burn",
            video.to_str().unwrap(),
            subtitle.to_str().unwrap(),
        ]);
        assert!(validate_burn(&args).is_err());
    }

    #[test]
    fn test_default_output_sits_next_to_input() {
        let video = VideoAsset::new("clip.mp4", Vec::new());
        assert_eq!(
            default_output(Path::new("/videos/clip.mp4"), &video),
            PathBuf::from("/videos/burned_clip.mp4")
        );
    }

    #[test]
    fn test_probe_and_style_subcommands_parse() {
        match parse(&["hardsub", "probe", "clip.mp4", "--ffmpeg", "/opt/ffmpeg"]).command {
            Command::Probe(args) => {
                assert_eq!(args.engine.ffmpeg, Some(PathBuf::from("/opt/ffmpeg")))
            }
            _ => panic!("expected probe"),
        }
        match parse(&["hardsub", "style", "--save", "out.json"]).command {
            Command::Style(args) => assert_eq!(args.save, Some(PathBuf::from("out.json"))),
            _ => panic!("expected style"),
        }
    }
}
