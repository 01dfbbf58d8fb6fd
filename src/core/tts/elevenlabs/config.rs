//! Configuration for the ElevenLabs TTS backend.

use std::time::Duration;

use crate::config::{DEFAULT_ELEVENLABS_BASE_URL, ServerConfig};

/// ElevenLabs client configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API key sent in the `xi-api-key` header
    pub api_key: String,
    /// API base URL; overridable for proxies and mocked backends
    pub base_url: String,
    /// Total-request timeout applied to every synthesis call
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ElevenLabsConfig {
    /// Build the client configuration from server configuration. Returns
    /// `None` when no API key is configured.
    pub fn from_server_config(config: &ServerConfig) -> Option<Self> {
        let api_key = config.elevenlabs_api_key.clone()?;
        Some(Self {
            api_key,
            base_url: config.elevenlabs_base_url.clone(),
            timeout: Duration::from_secs(config.synthesis_timeout_seconds),
        })
    }
}
