pub mod ffmpeg_log;
pub mod ffmpeg_process_engine;
