//! Audio log listing endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// Maximum number of entries returned per request
const LOG_PAGE_SIZE: usize = 100;

/// List the most recent audio log entries, newest first.
pub async fn list_audio_logs(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "logs": state.audio_log.recent(LOG_PAGE_SIZE) }))
}
