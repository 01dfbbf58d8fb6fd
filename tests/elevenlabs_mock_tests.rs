//! ElevenLabs client tests against a mocked backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voiceflow_gateway::core::tts::{
    ElevenLabsConfig, ElevenLabsTTS, SpeechSynthesizer, TTSError,
};

fn client_for(mock: &MockServer) -> ElevenLabsTTS {
    ElevenLabsTTS::new(ElevenLabsConfig {
        api_key: "test-key".to_string(),
        base_url: mock.uri(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn test_synthesize_sends_expected_request_and_streams_audio() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-1"))
        .and(header("xi-api-key", "test-key"))
        .and(body_json(json!({
            "text": "Hello, world!",
            "model_id": "model-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"audio-bytes"[..]))
        .expect(1)
        .mount(&mock)
        .await;

    let tts = client_for(&mock);
    let audio = tts
        .synthesize("Hello, world!", "voice-1", "model-1")
        .await
        .unwrap();
    let bytes = audio.collect().await.unwrap();
    assert_eq!(&bytes[..], b"audio-bytes");
}

#[tokio::test]
async fn test_synthesize_surfaces_api_errors() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock)
        .await;

    let tts = client_for(&mock);
    let err = tts
        .synthesize("Hello", "voice-1", "model-1")
        .await
        .unwrap_err();
    match err {
        TTSError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_synthesize_times_out_on_stalled_backend() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(&b"audio"[..])
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock)
        .await;

    let tts = ElevenLabsTTS::new(ElevenLabsConfig {
        api_key: "test-key".to_string(),
        base_url: mock.uri(),
        timeout: Duration::from_millis(200),
    })
    .unwrap();

    let err = tts
        .synthesize("Hello", "voice-1", "model-1")
        .await
        .unwrap_err();
    assert!(matches!(err, TTSError::Http(_)));
}
