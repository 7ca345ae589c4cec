use crate::shared::constants::OUTPUT_MIME_TYPE;

/// A rendered video ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl VideoArtifact {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: OUTPUT_MIME_TYPE,
            data,
        }
    }
}

/// Hands a finished artifact to whoever asked for it.
pub trait ArtifactSink: Send {
    fn deliver(&mut self, artifact: &VideoArtifact) -> std::io::Result<()>;
}
