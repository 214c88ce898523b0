use thiserror::Error;

use crate::protocol::MAX_PAYLOAD_LEN;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("connection closed mid-frame ({got} of {expected} bytes)")]
    TruncatedTransmission { expected: usize, got: usize },

    #[error("peer stopped accepting bytes mid-frame")]
    PartialTransmission,

    #[error("payload of {0} bytes exceeds the {MAX_PAYLOAD_LEN}-byte frame limit")]
    PayloadTooLarge(usize),

    #[error("failed to spawn subprocess: {0}")]
    SpawnFailure(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
