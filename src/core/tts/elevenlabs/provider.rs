//! ElevenLabs TTS provider implementation.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.elevenlabs.io/v1/text-to-speech/{voice_id}`
//! - Auth: `xi-api-key` header
//! - Body: `{"text": ..., "model_id": ...}`
//! - Response: raw audio bytes (mp3 by default), streamed

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::json;
use tracing::debug;

use super::config::ElevenLabsConfig;
use crate::core::tts::base::{SpeechSynthesizer, SynthesisAudio, TTSError, TTSResult};

/// ElevenLabs TTS client backed by the HTTP streaming API
#[derive(Debug)]
pub struct ElevenLabsTTS {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsTTS {
    /// Create a new ElevenLabs TTS client.
    ///
    /// Fails when no API key is configured or the HTTP client cannot be
    /// built, so a broken backend is detectable before any session exists.
    pub fn new(config: ElevenLabsConfig) -> TTSResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TTSError::MissingCredentials(
                "ELEVENLABS_API_KEY".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TTSError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn speech_url(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, voice_id)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTTS {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        model_id: &str,
    ) -> TTSResult<SynthesisAudio> {
        let response = self
            .client
            .post(self.speech_url(voice_id))
            .header("xi-api-key", &self.api_key)
            .json(&json!({
                "text": text,
                "model_id": model_id,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TTSError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(voice_id, model_id, "ElevenLabs synthesis response streaming");
        let stream = response
            .bytes_stream()
            .map_err(|e| TTSError::Stream(e.to_string()));
        Ok(SynthesisAudio::Streamed(Box::pin(stream)))
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_creation_requires_api_key() {
        let config = ElevenLabsConfig::default();
        let err = ElevenLabsTTS::new(config).unwrap_err();
        assert!(matches!(err, TTSError::MissingCredentials(_)));
    }

    #[test]
    fn test_creation_with_api_key() {
        let config = ElevenLabsConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        let tts = ElevenLabsTTS::new(config).unwrap();
        assert_eq!(tts.name(), "elevenlabs");
    }

    #[test]
    fn test_speech_url_building() {
        let config = ElevenLabsConfig {
            api_key: "test-key".to_string(),
            base_url: "https://api.elevenlabs.io/".to_string(),
            timeout: Duration::from_secs(30),
        };
        let tts = ElevenLabsTTS::new(config).unwrap();
        assert_eq!(
            tts.speech_url("9BWtsMINqrJLrRacOk9x"),
            "https://api.elevenlabs.io/v1/text-to-speech/9BWtsMINqrJLrRacOk9x"
        );
    }
}
