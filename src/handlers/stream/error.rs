//! Session fault taxonomy.

use thiserror::Error;

use super::messages::ErrorCode;

/// Fault raised while dispatching one inbound event.
///
/// Every variant maps to exactly one wire error code; faults are converted
/// to a single `error` reply at the dispatch boundary and never terminate
/// the connection.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid JSON payload")]
    InvalidJson(#[source] serde_json::Error),

    #[error("unrecognized event: {0}")]
    UnknownEvent(String),

    /// Fault while assembling the synthesized audio (stream drain, chunk
    /// concatenation), distinct from a backend-raised fault
    #[error("audio processing failed: {0}")]
    Audio(String),

    /// Fault raised by the synthesis backend itself
    #[error("speech synthesis failed: {0}")]
    AudioGeneration(String),

    #[error("{0}")]
    Internal(String),
}

impl SessionError {
    /// Wire error code for this fault.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson(_) => ErrorCode::JsonError,
            Self::UnknownEvent(_) => ErrorCode::UnknownEvent,
            Self::Audio(_) => ErrorCode::AudioError,
            Self::AudioGeneration(_) => ErrorCode::AudioGenerationError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}
