//! End-to-end audio stream session tests
//!
//! Runs the full server on an ephemeral port with a mocked ElevenLabs
//! backend and drives the WebSocket protocol from a real client: the
//! start → media → binary-audio → stop flow, the silent no-op paths, the
//! error taxonomy, and the init failure at connect time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voiceflow_gateway::{ServerConfig, routes, sink::RecordSink, state::AppState};

const FAKE_AUDIO: &[u8] = b"fake-mp3-audio-bytes";

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.rate_limit_requests_per_second = 100000; // Disable for tests
    config
}

async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::api::create_api_router()
        .merge(routes::stream::create_stream_router())
        .with_state(state);
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (stream, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/audio/stream"))
        .await
        .expect("WebSocket connect failed");
    stream
}

async fn recv_json(ws: &mut WsClient) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("connection closed")
        .expect("WebSocket error");
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("invalid JSON reply"),
        other => panic!("expected text message, got {other:?}"),
    }
}

async fn recv_binary(ws: &mut WsClient) -> Vec<u8> {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("connection closed")
        .expect("WebSocket error");
    match msg {
        Message::Binary(bytes) => bytes.to_vec(),
        other => panic!("expected binary message, got {other:?}"),
    }
}

/// Mount the mocked speech endpoint and build server state pointing at it.
async fn state_with_mock_tts() -> (MockServer, Arc<AppState>) {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/9BWtsMINqrJLrRacOk9x"))
        .and(header("xi-api-key", "test-key"))
        .and(body_partial_json(json!({
            "text": "Message received",
            "model_id": "eleven_multilingual_v2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_AUDIO))
        .mount(&mock)
        .await;

    let mut config = test_config();
    config.elevenlabs_api_key = Some("test-key".to_string());
    config.elevenlabs_base_url = mock.uri();
    let state = AppState::new(config);
    (mock, state)
}

async fn wait_for_log_entry(audio_log: &Arc<dyn RecordSink>) -> Vec<Value> {
    for _ in 0..200 {
        let entries = audio_log.recent(10);
        if !entries.is_empty() {
            return entries
                .iter()
                .map(|e| serde_json::to_value(e).unwrap())
                .collect();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Vec::new()
}

#[tokio::test]
async fn test_full_streaming_scenario() {
    let (_mock, state) = state_with_mock_tts().await;
    let audio_log = state.audio_log.clone();
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;

    let established = recv_json(&mut ws).await;
    assert_eq!(established["event"], "connection_established");
    assert!(!established["client_id"].as_str().unwrap().is_empty());

    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    let started = recv_json(&mut ws).await;
    assert_eq!(started["event"], "started");
    assert_eq!(started["status"], "streaming");

    let payload = base64::engine::general_purpose::STANDARD.encode(b"caller audio");
    ws.send(Message::text(format!(
        r#"{{"event":"media","media":"{payload}"}}"#
    )))
    .await
    .unwrap();

    let audio = recv_binary(&mut ws).await;
    assert_eq!(audio, FAKE_AUDIO);

    let entries = wait_for_log_entry(&audio_log).await;
    assert_eq!(entries.len(), 1, "exactly one log entry expected");
    assert_eq!(entries[0]["event"], "media_processed");
    assert_eq!(entries[0]["response_text"], "Message received");
    assert_eq!(
        entries[0]["audio_length"],
        FAKE_AUDIO.len() as f64 / 1000.0
    );
    assert_eq!(entries[0]["ip_address"], "127.0.0.1");

    ws.send(Message::text(r#"{"event":"stop"}"#)).await.unwrap();
    let stopped = recv_json(&mut ws).await;
    assert_eq!(stopped["event"], "stopped");
    assert_eq!(stopped["status"], "stopped");

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn test_media_before_start_is_ignored() {
    let (_mock, state) = state_with_mock_tts().await;
    let audio_log = state.audio_log.clone();
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;
    recv_json(&mut ws).await; // connection_established

    ws.send(Message::text(r#"{"event":"media","media":"dGVzdA=="}"#))
        .await
        .unwrap();
    // The media event is a silent no-op: the next reply must belong to the
    // start event, not the media event.
    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["event"], "started");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(audio_log.recent(10).is_empty(), "no log entry expected");
}

#[tokio::test]
async fn test_empty_media_is_silent_while_streaming() {
    let (_mock, state) = state_with_mock_tts().await;
    let audio_log = state.audio_log.clone();
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;
    recv_json(&mut ws).await; // connection_established

    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    recv_json(&mut ws).await; // started

    ws.send(Message::text(r#"{"event":"media","media":""}"#))
        .await
        .unwrap();
    ws.send(Message::text(r#"{"event":"connected"}"#)).await.unwrap();

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["event"], "ready", "empty media must produce no reply");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(audio_log.recent(10).is_empty());
}

#[tokio::test]
async fn test_unknown_event_keeps_connection_open() {
    let (_mock, state) = state_with_mock_tts().await;
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;
    recv_json(&mut ws).await; // connection_established

    ws.send(Message::text(r#"{"event":"bogus"}"#)).await.unwrap();
    let error = recv_json(&mut ws).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["code"], "unknown_event");

    // The connection is still usable afterwards
    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    let started = recv_json(&mut ws).await;
    assert_eq!(started["event"], "started");
}

#[tokio::test]
async fn test_malformed_json_yields_json_error() {
    let (_mock, state) = state_with_mock_tts().await;
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;
    recv_json(&mut ws).await; // connection_established

    ws.send(Message::text("this is not json")).await.unwrap();
    let error = recv_json(&mut ws).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["code"], "json_error");

    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    assert_eq!(recv_json(&mut ws).await["event"], "started");
}

#[tokio::test]
async fn test_double_start_is_idempotent() {
    let (_mock, state) = state_with_mock_tts().await;
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;
    recv_json(&mut ws).await; // connection_established

    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();

    for _ in 0..2 {
        let reply = recv_json(&mut ws).await;
        assert_eq!(reply["event"], "started");
        assert_eq!(reply["status"], "streaming");
    }
}

#[tokio::test]
async fn test_synthesis_failure_yields_audio_generation_error() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&mock)
        .await;

    let mut config = test_config();
    config.elevenlabs_api_key = Some("test-key".to_string());
    config.elevenlabs_base_url = mock.uri();
    let state = AppState::new(config);
    let audio_log = state.audio_log.clone();
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;
    recv_json(&mut ws).await; // connection_established

    ws.send(Message::text(r#"{"event":"start"}"#)).await.unwrap();
    recv_json(&mut ws).await; // started

    ws.send(Message::text(r#"{"event":"media","media":"dGVzdA=="}"#))
        .await
        .unwrap();
    let error = recv_json(&mut ws).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["code"], "audio_generation_error");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(audio_log.recent(10).is_empty(), "failed media must not be logged");
}

#[tokio::test]
async fn test_init_error_when_backend_unavailable() {
    // No API key: the synthesis backend cannot be constructed at startup
    let state = AppState::new(test_config());
    assert!(state.synthesizer.is_none());
    let addr = spawn_server(state).await;

    let mut ws = connect(addr).await;

    let error = recv_json(&mut ws).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["code"], "init_error");

    // The server closes the connection right after the notification
    let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for close");
    match next {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("expected close, got {other:?}"),
    }
}
