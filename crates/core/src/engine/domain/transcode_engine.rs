use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("transcode engine is not loaded")]
    NotLoaded,
    #[error("transcoder binary '{name}' not found or not runnable")]
    BinaryNotFound { name: String },
    #[error("failed to start transcoder: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("invalid working file name '{name}'")]
    InvalidName { name: String },
    #[error("working file '{name}' does not exist")]
    NotFound { name: String },
    #[error("I/O error on working file '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("transcoder exited with {status}:\n{log}")]
    Failed { status: String, log: String },
    #[error("transcoder was terminated before completion:\n{log}")]
    Terminated { log: String },
}

/// Boundary to the external audio/video transcoder.
///
/// An engine owns an isolated working filesystem addressed by flat file
/// names. Lifecycle: create, `load` (idempotent), use across jobs, drop.
/// Jobs run one at a time per engine, which `&mut self` enforces.
pub trait TranscodeEngine: Send {
    /// Prepares the engine for use. Calling it again once loaded is a no-op.
    fn load(&mut self) -> Result<(), EngineError>;

    fn is_loaded(&self) -> bool;

    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<(), EngineError>;

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    fn unlink(&mut self, name: &str) -> Result<(), EngineError>;

    /// Runs one transcoder invocation to completion.
    ///
    /// `on_progress` receives the completion ratio in `0.0..=1.0` while the
    /// invocation runs. Failure carries the diagnostic log.
    fn run(
        &mut self,
        args: &[String],
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), EngineError>;

    /// Diagnostic output of the most recent `run`.
    fn log(&self) -> &str;
}
