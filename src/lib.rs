pub mod config;
pub mod core;
pub mod handlers;
pub mod provision;
pub mod routes;
pub mod sink;
pub mod state;
pub mod store;

// Re-export commonly used items for convenience
pub use crate::config::ServerConfig;
pub use crate::core::tts::{SpeechSynthesizer, SynthesisAudio, TTSError, TTSResult};
pub use crate::state::AppState;
