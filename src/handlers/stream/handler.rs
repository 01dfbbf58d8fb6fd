//! Audio stream WebSocket handler
//!
//! Accepts incoming connections, allocates one [`StreamSession`] per
//! connection and pumps inbound frames through it until disconnect. A
//! connection whose synthesis backend failed to initialize is notified with
//! an `init_error` and closed immediately; no session is created for it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::messages::{ErrorCode, MessageRoute, OutboundMessage};
use super::session::{StreamSession, VoiceSettings, send_message};

/// Outbound channel buffer size per connection
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Audio stream WebSocket handler
///
/// Upgrades the HTTP connection to WebSocket for bidirectional audio
/// streaming: JSON control/media events in, JSON status messages and binary
/// synthesized audio out.
pub async fn audio_stream_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!(%peer_addr, "audio stream connection upgrade requested");
    ws.on_upgrade(move |socket| handle_stream_socket(socket, state, peer_addr))
}

/// Handle one audio stream connection until disconnect.
async fn handle_stream_socket(socket: WebSocket, app_state: Arc<AppState>, peer_addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(CHANNEL_BUFFER_SIZE);

    // Sender task: the single writer for this connection. Structured
    // messages and binary audio share the channel, so a media event's reply
    // is never interleaved with another message.
    let sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            let should_close = matches!(route, MessageRoute::Close);

            let result = match route {
                MessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                    Ok(json) => sender.send(Message::Text(json.into())).await,
                    Err(e) => {
                        error!("failed to serialize outgoing message: {e}");
                        continue;
                    }
                },
                MessageRoute::Audio(data) => sender.send(Message::Binary(data)).await,
                MessageRoute::Close => sender.send(Message::Close(None)).await,
            };

            if let Err(e) = result {
                debug!("failed to send WebSocket message: {e}");
                break;
            }

            if should_close {
                break;
            }
        }
    });

    // A connection without a working synthesis backend is not serviceable.
    let Some(synthesizer) = app_state.synthesizer.clone() else {
        error!(%peer_addr, "rejecting connection: speech synthesis client unavailable");
        send_message(
            &message_tx,
            OutboundMessage::error(
                ErrorCode::InitError,
                "speech synthesis client not initialized",
            ),
        )
        .await;
        let _ = message_tx.send(MessageRoute::Close).await;
        drop(message_tx);
        let _ = sender_task.await;
        return;
    };

    let session_id = Uuid::new_v4().to_string();
    let mut session = StreamSession::new(
        session_id.clone(),
        Some(peer_addr),
        synthesizer,
        app_state.transcriber.clone(),
        app_state.audio_log.clone(),
        VoiceSettings {
            voice_id: app_state.config.tts_voice_id.clone(),
            model_id: app_state.config.tts_model_id.clone(),
        },
    );

    info!(session_id = %session_id, %peer_addr, "client connected");
    send_message(
        &message_tx,
        OutboundMessage::connection_established(&session_id),
    )
    .await;

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                session.process_text(text.as_str(), &message_tx).await;
            }
            Ok(Message::Binary(data)) => {
                debug!(session_id = %session_id, bytes = data.len(), "ignoring binary frame");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(reason)) => {
                info!(session_id = %session_id, ?reason, "client closed connection");
                break;
            }
            Err(e) => {
                warn!(session_id = %session_id, "WebSocket error: {e}");
                break;
            }
        }
    }

    session.close();
    drop(message_tx);
    let _ = sender_task.await;
    info!(session_id = %session_id, "session closed");
}
