//! Error types for the editor

use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),

    #[error("Editor actor has stopped")]
    ActorStopped,
}
