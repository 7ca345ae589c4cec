use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::style::domain::style_error::StyleError;
use crate::style::domain::subtitle_style::SubtitleStyle;

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("failed to read preset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write preset {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid preset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("preset {path} describes an invalid style: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: StyleError,
    },
}

/// Loads a style preset. Fields missing from the file keep their defaults.
pub fn load(path: &Path) -> Result<SubtitleStyle, PresetError> {
    let json = fs::read_to_string(path).map_err(|e| PresetError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let style: SubtitleStyle = serde_json::from_str(&json).map_err(|e| PresetError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    style.validate().map_err(|e| PresetError::Invalid {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(style)
}

pub fn save(path: &Path, style: &SubtitleStyle) -> Result<(), PresetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PresetError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let json = serde_json::to_string_pretty(style).map_err(|e| PresetError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| PresetError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Saved style preset to {}", path.display());
    Ok(())
}
