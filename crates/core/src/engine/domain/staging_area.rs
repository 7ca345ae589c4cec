use super::transcode_engine::{EngineError, TranscodeEngine};

/// A job-scoped view of the engine's working filesystem.
///
/// Every name is prefixed with the namespace so concurrent or consecutive
/// jobs never collide, and every file staged or reserved through the area
/// is unlinked when it drops, whatever the outcome of the job.
pub struct StagingArea<'a> {
    engine: &'a mut dyn TranscodeEngine,
    namespace: String,
    staged: Vec<String>,
}

impl<'a> StagingArea<'a> {
    /// Loads the engine if needed and opens an empty area.
    pub fn open(
        engine: &'a mut dyn TranscodeEngine,
        namespace: impl Into<String>,
    ) -> Result<Self, EngineError> {
        if !engine.is_loaded() {
            engine.load()?;
        }
        Ok(Self {
            engine,
            namespace: namespace.into(),
            staged: Vec::new(),
        })
    }

    /// The engine-side name for `name` inside this area.
    pub fn path_for(&self, name: &str) -> String {
        format!("{}{}", self.namespace, name)
    }

    /// Writes `data` and returns the engine-side name.
    pub fn stage(&mut self, name: &str, data: &[u8]) -> Result<String, EngineError> {
        let path = self.reserve(name);
        self.engine.write_file(&path, data)?;
        Ok(path)
    }

    /// Registers a name the engine will create, so it is cleaned up too.
    pub fn reserve(&mut self, name: &str) -> String {
        let path = self.path_for(name);
        if !self.staged.contains(&path) {
            self.staged.push(path.clone());
        }
        path
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        self.engine.read_file(path)
    }

    pub fn run(
        &mut self,
        args: &[String],
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), EngineError> {
        self.engine.run(args, on_progress)
    }

    pub fn log(&self) -> &str {
        self.engine.log()
    }
}

impl Drop for StagingArea<'_> {
    fn drop(&mut self) {
        for path in self.staged.drain(..) {
            match self.engine.unlink(&path) {
                Ok(()) | Err(EngineError::NotFound { .. }) => {}
                Err(e) => log::warn!("Failed to remove working file {path}: {e}"),
            }
        }
    }
}
