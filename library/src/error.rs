use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimingError {
    #[error("Invalid frame rate: {0} fps")]
    InvalidFps(u32),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Frame can only be a valid number, got '{0}'")]
    InvalidFrameEdit(String),
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Malformed timing document: {0}")]
    MalformedDocument(String),
    #[error("Timing file version {found} is newer than this version ({current})")]
    IncompatibleVersion { found: String, current: String },
    #[error("Nothing to save: the timing is empty")]
    NothingToSave,
    #[error("The timing has no file path yet")]
    NoFilePath,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tempfile::PersistError> for TimingError {
    fn from(err: tempfile::PersistError) -> Self {
        TimingError::Io(err.error)
    }
}
