//! Transcription of inbound media payloads.
//!
//! Inbound media is not transcribed today: sessions acknowledge every
//! payload with a fixed reply, and the payload itself only gates whether a
//! reply happens at all. The [`Transcriber`] trait is the seam where a real
//! speech-to-text backend plugs in without touching the media pipeline.

use async_trait::async_trait;
use thiserror::Error;

/// Error raised by a transcription backend
#[derive(Debug, Error)]
#[error("transcription failed: {0}")]
pub struct TranscribeError(pub String);

/// Converts an inbound media payload into reply text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Produce the text to synthesize in response to `payload` (the opaque
    /// encoded media field from the client).
    async fn transcribe(&self, payload: &str) -> Result<String, TranscribeError>;
}

/// Transcriber that ignores the payload and returns a fixed reply.
pub struct CannedTranscriber {
    reply_text: String,
}

impl CannedTranscriber {
    pub fn new(reply_text: impl Into<String>) -> Self {
        Self {
            reply_text: reply_text.into(),
        }
    }
}

#[async_trait]
impl Transcriber for CannedTranscriber {
    async fn transcribe(&self, _payload: &str) -> Result<String, TranscribeError> {
        Ok(self.reply_text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_transcriber_ignores_payload() {
        let transcriber = CannedTranscriber::new("Message received");
        let text = transcriber.transcribe("dGVzdA==").await.unwrap();
        assert_eq!(text, "Message received");

        let text = transcriber.transcribe("completely different").await.unwrap();
        assert_eq!(text, "Message received");
    }
}
