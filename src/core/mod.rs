//! Core speech-processing services
//!
//! - `tts` - Speech synthesis backends (ElevenLabs)
//! - `stt` - Transcription of inbound media payloads

pub mod stt;
pub mod tts;
