//! Error types for the bridge

use crate::protocol::Origin;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Envelope from {actual}, expected {expected}")]
    ForeignOrigin { expected: Origin, actual: Origin },

    #[error("Counterpart disconnected")]
    Disconnected,
}
