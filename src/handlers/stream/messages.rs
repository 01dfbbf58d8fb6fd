//! Audio stream WebSocket message types
//!
//! Defines the wire protocol for the audio streaming endpoint: inbound
//! control/media events keyed by `event`, outbound status and error
//! messages, and the routing enum carried on the per-connection channel.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use super::error::SessionError;

// =============================================================================
// Incoming Events (Client -> Server)
// =============================================================================

/// Inbound event received on the audio stream connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Client-side handshake acknowledgment
    Connected,
    /// Begin processing media events
    Start,
    /// Stop processing media events
    Stop,
    /// Media payload (opaque encoded audio)
    Media { payload: Option<String> },
}

impl InboundEvent {
    /// Parse one inbound text frame.
    ///
    /// Parsing is two-stage so the two failure categories stay distinct:
    /// text that is not JSON at all is a `json_error`, while valid JSON with
    /// an unrecognized (or missing) `event` label is an `unknown_event`.
    pub fn parse(text: &str) -> Result<Self, SessionError> {
        let value: Value = serde_json::from_str(text).map_err(SessionError::InvalidJson)?;
        let label = value.get("event").and_then(Value::as_str).unwrap_or_default();
        match label {
            "connected" => Ok(Self::Connected),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "media" => Ok(Self::Media {
                payload: value
                    .get("media")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            }),
            other => Err(SessionError::UnknownEvent(other.to_string())),
        }
    }
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Error category surfaced to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Synthesis backend unavailable; the connection is closed
    InitError,
    /// Inbound frame was not parseable JSON
    JsonError,
    /// Valid JSON with an unrecognized event label
    UnknownEvent,
    /// Fault while assembling the synthesized audio
    AudioError,
    /// Fault raised by the synthesis backend itself
    AudioGenerationError,
    /// Any other fault during dispatch
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitError => "init_error",
            Self::JsonError => "json_error",
            Self::UnknownEvent => "unknown_event",
            Self::AudioError => "audio_error",
            Self::AudioGenerationError => "audio_generation_error",
            Self::InternalError => "internal_error",
        }
    }
}

/// Outbound structured message on the audio stream connection
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundMessage {
    ConnectionEstablished { message: String, client_id: String },
    Ready { message: String, client_id: String },
    Started { message: String, status: String },
    Stopped { message: String, status: String },
    Error { code: ErrorCode, message: String },
}

impl OutboundMessage {
    pub fn connection_established(client_id: &str) -> Self {
        Self::ConnectionEstablished {
            message: "WebSocket connection established".to_string(),
            client_id: client_id.to_string(),
        }
    }

    pub fn ready(client_id: &str) -> Self {
        Self::Ready {
            message: "Ready to stream".to_string(),
            client_id: client_id.to_string(),
        }
    }

    pub fn started() -> Self {
        Self::Started {
            message: "Streaming started".to_string(),
            status: "streaming".to_string(),
        }
    }

    pub fn stopped() -> Self {
        Self::Stopped {
            message: "Streaming stopped".to_string(),
            status: "stopped".to_string(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Message Routing
// =============================================================================

/// Message routing on the per-connection outbound channel
pub enum MessageRoute {
    /// JSON text message
    Outgoing(OutboundMessage),
    /// Binary audio reply
    Audio(Bytes),
    /// Close the connection
    Close,
}
