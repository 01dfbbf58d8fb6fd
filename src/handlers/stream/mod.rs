//! Audio stream WebSocket endpoint: per-connection session state machine
//! bridging inbound media events to speech synthesis.

mod error;
mod handler;
mod messages;
mod session;

pub use error::SessionError;
pub use handler::audio_stream_handler;
pub use messages::{ErrorCode, InboundEvent, MessageRoute, OutboundMessage};
pub use session::{StreamSession, VoiceSettings};
