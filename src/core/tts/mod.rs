pub mod elevenlabs;

mod base;

pub use base::{
    AudioChunks, AudioStream, SpeechSynthesizer, SynthesisAudio, TTSError, TTSResult,
};
pub use elevenlabs::{ElevenLabsConfig, ElevenLabsTTS};
