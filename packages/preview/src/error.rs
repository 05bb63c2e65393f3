//! Error types for the preview

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Preview actor has stopped")]
    ActorStopped,
}
