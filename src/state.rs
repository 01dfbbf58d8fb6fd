//! Shared application state.
//!
//! Holds the handles every request handler needs: configuration, the speech
//! synthesis backend, the transcription hook, the audio log sink and the
//! call record store. The synthesis backend is built once at startup; a
//! construction failure is recorded as an absent handle so the connection
//! acceptor can reject sessions instead of failing on first use.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::ServerConfig;
use crate::core::stt::{CannedTranscriber, Transcriber};
use crate::core::tts::{ElevenLabsConfig, ElevenLabsTTS, SpeechSynthesizer};
use crate::sink::{MemoryAudioLog, RecordSink};
use crate::store::CallStore;

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    /// Shared synthesis backend; `None` when construction failed at startup
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    /// Transcription hook applied to inbound media payloads
    pub transcriber: Arc<dyn Transcriber>,
    /// Audit sink for processed media events
    pub audio_log: Arc<dyn RecordSink>,
    /// Call record store fed by the incoming-call webhook
    pub calls: Arc<CallStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let synthesizer = build_synthesizer(&config);
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(CannedTranscriber::new(config.media_reply_text.clone()));
        let audio_log: Arc<dyn RecordSink> =
            Arc::new(MemoryAudioLog::new(config.audio_log_capacity));

        Arc::new(Self {
            config,
            synthesizer,
            transcriber,
            audio_log,
            calls: Arc::new(CallStore::new()),
        })
    }
}

fn build_synthesizer(config: &ServerConfig) -> Option<Arc<dyn SpeechSynthesizer>> {
    let Some(client_config) = ElevenLabsConfig::from_server_config(config) else {
        error!("ELEVENLABS_API_KEY not set; audio stream sessions will be rejected");
        return None;
    };

    match ElevenLabsTTS::new(client_config) {
        Ok(tts) => {
            info!("ElevenLabs client initialized");
            Some(Arc::new(tts))
        }
        Err(e) => {
            error!("failed to initialize ElevenLabs client: {e}");
            None
        }
    }
}
