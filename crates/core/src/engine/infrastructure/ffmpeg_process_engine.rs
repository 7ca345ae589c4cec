use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{ChildStderr, Command, Stdio};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use tempfile::TempDir;

use super::ffmpeg_log::{LineSplitter, ProgressTracker};
use crate::engine::domain::transcode_engine::{EngineError, TranscodeEngine};
use crate::shared::constants::FFMPEG_BINARY_NAME;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Runs the system `ffmpeg` executable as the transcode engine.
///
/// The working filesystem is a private temporary directory created on
/// `load` and removed when the engine is dropped. Invocations run with that
/// directory as their working directory, so arguments use bare file names.
/// Progress is derived from the `Duration:`/`time=` fields of stderr, which
/// a reader thread forwards line by line over a channel to the caller's
/// thread.
pub struct FfmpegProcessEngine {
    binary_override: Option<PathBuf>,
    binary: Option<PathBuf>,
    workdir: Option<TempDir>,
    log: String,
}

impl FfmpegProcessEngine {
    /// Looks up `ffmpeg` on `PATH` at load time.
    pub fn new() -> Self {
        Self {
            binary_override: None,
            binary: None,
            workdir: None,
            log: String::new(),
        }
    }

    /// Uses the given executable instead of searching `PATH`.
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary_override: Some(path.into()),
            ..Self::new()
        }
    }

    /// The resolved executable, once loaded.
    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    fn resolve_binary(&self) -> Result<PathBuf, EngineError> {
        match &self.binary_override {
            Some(path) => Ok(path.clone()),
            None => which::which(FFMPEG_BINARY_NAME).map_err(|_| EngineError::BinaryNotFound {
                name: FFMPEG_BINARY_NAME.to_string(),
            }),
        }
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, EngineError> {
        let workdir = self.workdir.as_ref().ok_or(EngineError::NotLoaded)?;
        if !is_flat_name(name) {
            return Err(EngineError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(workdir.path().join(name))
    }
}

impl Default for FfmpegProcessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscodeEngine for FfmpegProcessEngine {
    fn load(&mut self) -> Result<(), EngineError> {
        if self.is_loaded() {
            return Ok(());
        }

        let binary = self.resolve_binary()?;
        let runnable = Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !runnable {
            return Err(EngineError::BinaryNotFound {
                name: binary.display().to_string(),
            });
        }

        let workdir = tempfile::Builder::new()
            .prefix("hardsub-")
            .tempdir()
            .map_err(|e| EngineError::Io {
                name: "<working directory>".to_string(),
                source: e,
            })?;

        log::info!(
            "Using ffmpeg at {} (working directory {})",
            binary.display(),
            workdir.path().display()
        );
        self.binary = Some(binary);
        self.workdir = Some(workdir);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.binary.is_some() && self.workdir.is_some()
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<(), EngineError> {
        let path = self.path_of(name)?;
        fs::write(&path, data).map_err(|e| EngineError::Io {
            name: name.to_string(),
            source: e,
        })
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.path_of(name)?;
        fs::read(&path).map_err(|e| file_error(name, e))
    }

    fn unlink(&mut self, name: &str) -> Result<(), EngineError> {
        let path = self.path_of(name)?;
        fs::remove_file(&path).map_err(|e| file_error(name, e))
    }

    fn run(
        &mut self,
        args: &[String],
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), EngineError> {
        let (Some(binary), Some(workdir)) = (&self.binary, &self.workdir) else {
            return Err(EngineError::NotLoaded);
        };

        log::debug!("ffmpeg {}", args.join(" "));
        let mut child = Command::new(binary)
            .current_dir(workdir.path())
            .args(["-hide_banner", "-nostdin", "-y"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stderr = child.stderr.take().ok_or_else(|| {
            EngineError::Spawn(std::io::Error::other("ffmpeg stderr was not captured"))
        })?;
        let (line_tx, line_rx) = crossbeam_channel::unbounded::<String>();
        let reader = spawn_log_reader(stderr, line_tx);

        self.log.clear();
        let mut tracker = ProgressTracker::new();
        for line in line_rx {
            if let Some(ratio) = tracker.feed(&line) {
                on_progress(ratio);
            }
            self.log.push_str(&line);
            self.log.push('\n');
        }

        match reader.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Lost part of the ffmpeg log: {e}"),
            Err(_) => log::warn!("ffmpeg log reader panicked"),
        }

        let status = child.wait().map_err(EngineError::Spawn)?;
        if status.success() {
            Ok(())
        } else if status.code().is_none() {
            Err(EngineError::Terminated {
                log: self.log.clone(),
            })
        } else {
            Err(EngineError::Failed {
                status: status.to_string(),
                log: self.log.clone(),
            })
        }
    }

    fn log(&self) -> &str {
        &self.log
    }
}

/// Names must stay inside the working directory.
fn is_flat_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !Path::new(name).is_absolute()
}

fn file_error(name: &str, e: std::io::Error) -> EngineError {
    if e.kind() == ErrorKind::NotFound {
        EngineError::NotFound {
            name: name.to_string(),
        }
    } else {
        EngineError::Io {
            name: name.to_string(),
            source: e,
        }
    }
}

fn spawn_log_reader(
    mut stderr: ChildStderr,
    line_tx: Sender<String>,
) -> JoinHandle<std::io::Result<()>> {
    std::thread::spawn(move || {
        let mut splitter = LineSplitter::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match stderr.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for line in splitter.push(&chunk[..read]) {
                if line_tx.send(line).is_err() {
                    return Ok(());
                }
            }
        }
        if let Some(line) = splitter.finish() {
            let _ = line_tx.send(line);
        }
        Ok(())
    })
}
