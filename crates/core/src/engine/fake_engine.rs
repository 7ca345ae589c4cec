use std::collections::HashMap;

use super::domain::transcode_engine::{EngineError, TranscodeEngine};

/// Sample stream description as ffmpeg prints it for a 24 fps H.264 input.
pub(crate) const STREAM_LOG_24FPS: &str = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'input.mp4':\n  \
     Duration: 00:00:10.00, start: 0.000000, bitrate: 1205 kb/s\n  \
     Stream #0:0(und): Video: h264 (High) (avc1 / 0x31637661), yuv420p, 1920x1080, 1000 kb/s, 24 fps, 24 tbr, 12288 tbn (default)\n  \
     Stream #0:1(und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 192 kb/s (default)\n";

/// In-memory engine for tests.
///
/// A run fails like ffmpeg does when its `-i` input is missing or empty.
/// Otherwise it reports `progress`, prints `stream_log` and writes `output`
/// to the last argument unless that is `-`.
pub(crate) struct FakeEngine {
    pub loaded: bool,
    pub load_count: usize,
    pub files: HashMap<String, Vec<u8>>,
    pub runs: Vec<Vec<String>>,
    pub unlinked: Vec<String>,
    pub stream_log: String,
    pub progress: Vec<f64>,
    pub output: Vec<u8>,
    pub fail_run: Option<String>,
    pub fail_writes_to: Option<String>,
    log: String,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            loaded: false,
            load_count: 0,
            files: HashMap::new(),
            runs: Vec::new(),
            unlinked: Vec::new(),
            stream_log: STREAM_LOG_24FPS.to_string(),
            progress: vec![0.0, 0.5, 1.0],
            output: b"rendered video".to_vec(),
            fail_run: None,
            fail_writes_to: None,
            log: String::new(),
        }
    }

    fn input_of(args: &[String]) -> Option<&str> {
        args.iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }
}

impl TranscodeEngine for FakeEngine {
    fn load(&mut self) -> Result<(), EngineError> {
        if !self.loaded {
            self.loaded = true;
            self.load_count += 1;
        }
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<(), EngineError> {
        if !self.loaded {
            return Err(EngineError::NotLoaded);
        }
        if self.fail_writes_to.as_deref().is_some_and(|n| name.ends_with(n)) {
            return Err(EngineError::Io {
                name: name.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                name: name.to_string(),
            })
    }

    fn unlink(&mut self, name: &str) -> Result<(), EngineError> {
        self.unlinked.push(name.to_string());
        self.files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::NotFound {
                name: name.to_string(),
            })
    }

    fn run(
        &mut self,
        args: &[String],
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), EngineError> {
        if !self.loaded {
            return Err(EngineError::NotLoaded);
        }
        self.runs.push(args.to_vec());

        let input = Self::input_of(args).unwrap_or_default().to_string();
        let readable = self.files.get(&input).is_some_and(|data| !data.is_empty());
        if !readable {
            self.log = format!("{input}: Invalid data found when processing input\n");
            return Err(EngineError::Failed {
                status: "exit status: 183".to_string(),
                log: self.log.clone(),
            });
        }
        if let Some(message) = &self.fail_run {
            self.log = format!("{}{message}\n", self.stream_log);
            return Err(EngineError::Failed {
                status: "exit status: 1".to_string(),
                log: self.log.clone(),
            });
        }

        self.log = self.stream_log.clone();
        for ratio in &self.progress {
            on_progress(*ratio);
        }
        if let Some(target) = args.last().filter(|t| t.as_str() != "-") {
            self.files.insert(target.clone(), self.output.clone());
        }
        Ok(())
    }

    fn log(&self) -> &str {
        &self.log
    }
}
