//! Base types shared by speech synthesis backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use thiserror::Error;

/// Result type for TTS operations
pub type TTSResult<T> = Result<T, TTSError>;

/// Errors raised by speech synthesis backends
#[derive(Debug, Error)]
pub enum TTSError {
    #[error("invalid TTS configuration: {0}")]
    InvalidConfiguration(String),

    #[error("missing API credential: {0}")]
    MissingCredentials(String),

    #[error("TTS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TTS API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Byte stream produced by a streaming synthesis response
pub type AudioStream = Pin<Box<dyn Stream<Item = TTSResult<Bytes>> + Send>>;

/// Fallible chunk sequence produced by a chunked synthesis response
pub type AudioChunks = Box<dyn Iterator<Item = TTSResult<Bytes>> + Send>;

/// Synthesized audio, tagged by the shape the backend returned it in.
///
/// Backends return whichever variant matches their transport: an HTTP
/// streaming body, a pre-chunked sequence, or a fully buffered byte blob.
/// [`SynthesisAudio::collect`] drains any shape into contiguous bytes, so
/// callers never probe capabilities at runtime.
pub enum SynthesisAudio {
    /// Audio arriving as an async byte stream; drained fully before replying
    Streamed(AudioStream),
    /// Audio arriving as discrete chunks; concatenated, aborting on the
    /// first failed chunk
    Chunked(AudioChunks),
    /// Audio already materialized as a single byte sequence
    Raw(Bytes),
}

impl SynthesisAudio {
    /// Drain this audio into a single contiguous byte sequence.
    pub async fn collect(self) -> TTSResult<Bytes> {
        match self {
            Self::Streamed(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.try_next().await? {
                    buf.extend_from_slice(&chunk);
                }
                Ok(buf.freeze())
            }
            Self::Chunked(chunks) => {
                let mut buf = BytesMut::new();
                for chunk in chunks {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
            Self::Raw(bytes) => Ok(bytes),
        }
    }
}

impl std::fmt::Debug for SynthesisAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streamed(_) => f.write_str("SynthesisAudio::Streamed(..)"),
            Self::Chunked(_) => f.write_str("SynthesisAudio::Chunked(..)"),
            Self::Raw(bytes) => write!(f, "SynthesisAudio::Raw({} bytes)", bytes.len()),
        }
    }
}

/// A text-to-speech backend.
///
/// Construction is where credential problems surface: a backend that cannot
/// be built is represented as an absent handle in [`crate::state::AppState`],
/// which the connection acceptor checks before any session is created.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the given voice and model, returning the audio
    /// in whichever shape the backend produced it.
    async fn synthesize(&self, text: &str, voice_id: &str, model_id: &str)
    -> TTSResult<SynthesisAudio>;

    /// Short provider identifier for logs.
    fn name(&self) -> &'static str;
}
