//! Error types for the workspace collaborators

use pagewright_editor::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Empty upload")]
    EmptyUpload,

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
