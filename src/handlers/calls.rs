//! Incoming-call webhook and call record endpoints.
//!
//! The telephony provider POSTs form-encoded call details to the webhook;
//! the reply is a TwiML voice-response document with a spoken greeting.
//! The remaining endpoints are thin CRUD over the call record store.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Form, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::store::{CallRecord, CallStatus};

/// Form fields posted by the telephony provider on an incoming call
#[derive(Debug, Deserialize)]
pub struct IncomingCallForm {
    #[serde(rename = "CallSid", default)]
    call_sid: Option<String>,
    #[serde(rename = "From", default)]
    from_number: Option<String>,
    #[serde(rename = "To", default)]
    to_number: Option<String>,
}

/// Query parameters accepted by the call listing endpoint
#[derive(Debug, Deserialize)]
pub struct CallListQuery {
    pub status: Option<String>,
}

/// Partial update body for a call record
#[derive(Debug, Deserialize)]
pub struct CallUpdateRequest {
    pub status: Option<String>,
    pub duration: Option<u64>,
}

/// Handle an incoming call webhook and reply with TwiML.
///
/// All three call fields are required; the record is persisted best-effort
/// (a duplicate call SID is logged, not surfaced to the provider) and the
/// greeting is spoken regardless.
pub async fn handle_incoming_call(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IncomingCallForm>,
) -> Response {
    let (Some(call_sid), Some(from_number), Some(to_number)) = (
        non_empty(form.call_sid),
        non_empty(form.from_number),
        non_empty(form.to_number),
    ) else {
        error!("incoming call with incomplete data");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "incomplete call data"})),
        )
            .into_response();
    };

    match state
        .calls
        .insert(CallRecord::new(&call_sid, from_number, to_number))
    {
        Ok(()) => info!(%call_sid, "call registered"),
        Err(e) => warn!("failed to register call: {e}"),
    }

    voice_response(&state.config)
}

/// List all calls, optionally filtered by `?status=`.
pub async fn list_calls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallListQuery>,
) -> Json<Vec<CallRecord>> {
    let calls = match query.status.as_deref() {
        Some(raw) => match CallStatus::parse(raw) {
            Some(status) => state.calls.list(Some(status)),
            None => {
                // An unrecognized filter matches nothing rather than erroring
                debug!(status = raw, "unknown status filter");
                Vec::new()
            }
        },
        None => state.calls.list(None),
    };
    Json(calls)
}

/// Fetch one call by its SID.
pub async fn get_call(
    State(state): State<Arc<AppState>>,
    Path(call_sid): Path<String>,
) -> Response {
    match state.calls.get(&call_sid) {
        Some(call) => Json(call).into_response(),
        None => call_not_found(&call_sid),
    }
}

/// Partially update one call (status and/or duration).
pub async fn update_call(
    State(state): State<Arc<AppState>>,
    Path(call_sid): Path<String>,
    Json(update): Json<CallUpdateRequest>,
) -> Response {
    let status = match update.status.as_deref() {
        Some(raw) => match CallStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                warn!(%call_sid, status = raw, "rejecting unknown call status");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": format!("unknown call status: {raw}")})),
                )
                    .into_response();
            }
        },
        None => None,
    };

    match state.calls.update(&call_sid, status, update.duration) {
        Some(call) => {
            info!(%call_sid, "call updated");
            Json(call).into_response()
        }
        None => call_not_found(&call_sid),
    }
}

fn call_not_found(call_sid: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("call {call_sid} not found")})),
    )
        .into_response()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the TwiML voice-response document for an incoming call.
fn voice_response(config: &ServerConfig) -> Response {
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Response><Say voice="{}" language="{}">{}</Say></Response>"#,
        xml_escape(&config.greeting_voice),
        xml_escape(&config.greeting_language),
        xml_escape(&config.greeting_text),
    );
    ([(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
