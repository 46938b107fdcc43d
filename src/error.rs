// todolist/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    /// Data exists but is not a valid todo store. Only surfaced under `OnCorrupt::Fail`.
    #[error("corrupt todo store at {location}: {source}")]
    Corrupt { location: String, #[source] source: serde_json::Error },

    #[error("todo ids exhausted: no id left above the highest one in use")]
    IdsExhausted,

    #[error("serialize todo store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
