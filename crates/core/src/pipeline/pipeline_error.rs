use thiserror::Error;

use crate::engine::domain::transcode_engine::EngineError;
use crate::style::domain::style_error::StyleError;
use crate::subtitle::domain::subtitle_asset::UnsupportedSubtitleFormat;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    UnsupportedSubtitleFormat(#[from] UnsupportedSubtitleFormat),
    #[error("invalid subtitle style: {0}")]
    InvalidStyle(#[from] StyleError),
    #[error("failed to stage {name}: {source}")]
    StagingIo {
        name: String,
        #[source]
        source: EngineError,
    },
    #[error("transcoder failed:\n{diagnostic}")]
    EngineInvocation { diagnostic: String },
    #[error("transcoder produced no output in {name}")]
    EmptyOutput { name: String },
    #[error("failed to deliver output: {source}")]
    Delivery {
        #[source]
        source: std::io::Error,
    },
}
