//! Per-connection audio stream session.
//!
//! Owns one connection's lifecycle: event dispatch, streaming-state
//! enforcement, the media pipeline (transcription hook → synthesis → binary
//! reply) and the audit log trigger. Events are processed strictly
//! sequentially; replies go out through the connection's outbound channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::stt::Transcriber;
use crate::core::tts::SpeechSynthesizer;
use crate::sink::{AudioLogEntry, RecordSink};

use super::error::SessionError;
use super::messages::{InboundEvent, MessageRoute, OutboundMessage};

/// Event label recorded for successfully processed media
const MEDIA_PROCESSED_EVENT: &str = "media_processed";

/// Voice settings applied to every synthesized reply
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub model_id: String,
}

/// State for one open audio stream connection.
///
/// `streaming` gates the media pipeline: media events received while the
/// session is not streaming are dropped silently, by design. No session
/// state outlives the connection.
pub struct StreamSession {
    session_id: String,
    streaming: bool,
    peer_addr: Option<SocketAddr>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcriber: Arc<dyn Transcriber>,
    sink: Arc<dyn RecordSink>,
    voice: VoiceSettings,
}

impl StreamSession {
    pub fn new(
        session_id: String,
        peer_addr: Option<SocketAddr>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn Transcriber>,
        sink: Arc<dyn RecordSink>,
        voice: VoiceSettings,
    ) -> Self {
        Self {
            session_id,
            streaming: false,
            peer_addr,
            synthesizer,
            transcriber,
            sink,
            voice,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Release session state on disconnect.
    pub fn close(&mut self) {
        self.streaming = false;
    }

    /// Dispatch one inbound text frame.
    ///
    /// Faults never escape: each failed event produces at most one `error`
    /// reply and the session stays usable for subsequent events.
    pub async fn process_text(&mut self, text: &str, tx: &mpsc::Sender<MessageRoute>) {
        let result = match InboundEvent::parse(text) {
            Ok(event) => self.handle_event(event, tx).await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            warn!(
                session_id = %self.session_id,
                code = err.code().as_str(),
                "failed to process event: {err}"
            );
            send_message(tx, OutboundMessage::error(err.code(), err.to_string())).await;
        }
    }

    async fn handle_event(
        &mut self,
        event: InboundEvent,
        tx: &mpsc::Sender<MessageRoute>,
    ) -> Result<(), SessionError> {
        match event {
            InboundEvent::Connected => {
                send_message(tx, OutboundMessage::ready(&self.session_id)).await;
            }
            InboundEvent::Start => {
                self.streaming = true;
                info!(session_id = %self.session_id, "stream started");
                send_message(tx, OutboundMessage::started()).await;
            }
            InboundEvent::Stop => {
                self.streaming = false;
                info!(session_id = %self.session_id, "stream stopped");
                send_message(tx, OutboundMessage::stopped()).await;
            }
            InboundEvent::Media { payload } => self.handle_media(payload, tx).await?,
        }
        Ok(())
    }

    async fn handle_media(
        &mut self,
        payload: Option<String>,
        tx: &mpsc::Sender<MessageRoute>,
    ) -> Result<(), SessionError> {
        if !self.streaming {
            warn!(session_id = %self.session_id, "media received without an active stream");
            return Ok(());
        }

        let Some(payload) = payload.filter(|p| !p.is_empty()) else {
            warn!(session_id = %self.session_id, "media event with empty or missing payload");
            return Ok(());
        };

        let text = self
            .transcriber
            .transcribe(&payload)
            .await
            .map_err(|e| SessionError::Audio(e.to_string()))?;

        let audio = self
            .synthesizer
            .synthesize(&text, &self.voice.voice_id, &self.voice.model_id)
            .await
            .map_err(|e| SessionError::AudioGeneration(e.to_string()))?;

        let audio_bytes = audio
            .collect()
            .await
            .map_err(|e| SessionError::Audio(e.to_string()))?;

        let audio_length = audio_bytes.len() as f64 / 1000.0;
        debug!(
            session_id = %self.session_id,
            bytes = audio_bytes.len(),
            "synthesized audio reply"
        );

        if tx.send(MessageRoute::Audio(audio_bytes)).await.is_err() {
            debug!(session_id = %self.session_id, "client gone before audio reply was sent");
            return Ok(());
        }
        info!(session_id = %self.session_id, "audio reply sent");

        // Best-effort audit write; must not hold up the next event.
        let sink = Arc::clone(&self.sink);
        let entry = AudioLogEntry::new(
            MEDIA_PROCESSED_EVENT,
            text,
            audio_length,
            self.peer_addr.map(|addr| addr.ip().to_string()),
        );
        tokio::spawn(async move {
            if let Err(e) = sink.append(entry).await {
                warn!("failed to record audio log entry: {e}");
            }
        });

        Ok(())
    }
}

/// Queue a structured message on the outbound channel. A send failure means
/// the connection is already gone; it is logged by the sender task.
pub(crate) async fn send_message(tx: &mpsc::Sender<MessageRoute>, message: OutboundMessage) {
    let _ = tx.send(MessageRoute::Outgoing(message)).await;
}
