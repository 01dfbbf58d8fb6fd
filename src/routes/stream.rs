//! Audio stream WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::stream::audio_stream_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the audio stream WebSocket router
///
/// # Endpoint
///
/// `GET /audio/stream` - WebSocket upgrade for bidirectional audio streaming
///
/// # Protocol
///
/// After the upgrade, clients send JSON events keyed by `event`:
///
/// ```json
/// {"event": "start"}
/// {"event": "media", "media": "<base64 payload>"}
/// {"event": "stop"}
/// ```
///
/// The server responds with status messages (`connection_established`,
/// `ready`, `started`, `stopped`), `error` messages, and one standalone
/// binary frame of synthesized audio per processed media event.
pub fn create_stream_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/audio/stream", get(audio_stream_handler))
        .layer(TraceLayer::new_for_http())
}
