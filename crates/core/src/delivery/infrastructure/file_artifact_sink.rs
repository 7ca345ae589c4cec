use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::delivery::domain::artifact_sink::{ArtifactSink, VideoArtifact};

/// Writes artifacts to the local filesystem.
///
/// When the destination is an existing directory the artifact keeps its own
/// file name inside it; otherwise the destination is the exact output path.
/// Bytes go to a temporary file next to the target that is renamed into
/// place once complete, so a failed delivery leaves no partial file and
/// keeps whatever was at the target before.
pub struct FileArtifactSink {
    destination: PathBuf,
    written: Vec<PathBuf>,
}

impl FileArtifactSink {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target_for(&self, artifact: &VideoArtifact) -> PathBuf {
        if self.destination.is_dir() {
            self.destination.join(&artifact.file_name)
        } else {
            self.destination.clone()
        }
    }
}

impl ArtifactSink for FileArtifactSink {
    fn deliver(&mut self, artifact: &VideoArtifact) -> io::Result<()> {
        let target = self.target_for(artifact);
        write_atomically(&target, |file| file.write_all(&artifact.data))?;
        log::info!(
            "Wrote {} ({} bytes, {})",
            target.display(),
            artifact.data.len(),
            artifact.mime_type
        );
        self.written.push(target);
        Ok(())
    }
}

/// Fills a temporary sibling of `target` with `write`, then renames it over
/// `target`. On any error the temporary file is removed.
fn write_atomically(
    target: &Path,
    write: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
) -> io::Result<()> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".hardsub-")
        .suffix(".part")
        .tempfile_in(parent)?;
    write(&mut staged)?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}
