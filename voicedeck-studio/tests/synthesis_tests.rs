//! Gemini client against a local mock of the generateContent endpoint

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use voicedeck_common::codec::{decode_base64, encode_base64};
use voicedeck_common::SynthesisError;
use voicedeck_studio::synthesis::{GeminiConfig, GeminiSynthesizer, SpeechSynthesizer};

const API_KEY: &str = "test-key";

async fn generate_content(
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "API key not valid"}})),
        );
    }
    if model != "tts-model:generateContent" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": format!("model {} not found", model)}})),
        );
    }

    let voice = body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
        ["voiceName"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let text = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    match voice.as_str() {
        "Kore" => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{
                        "inlineData": {
                            "mimeType": "audio/L16;codec=pcm;rate=24000",
                            "data": encode_base64(text.as_bytes())
                        }
                    }]}
                }]
            })),
        ),
        "Silent" => (
            StatusCode::OK,
            Json(json!({"candidates": [{"content": {"parts": [{"text": "no audio"}]}}]})),
        ),
        "Busy" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"code": 429, "message": "Resource has been exhausted"}})),
        ),
        other => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {
                "code": 400,
                "message": format!("Voice name {} is not supported", other),
                "status": "INVALID_ARGUMENT"
            }})),
        ),
    }
}

async fn spawn_mock() -> String {
    let app = Router::new().route("/v1beta/models/:model", post(generate_content));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, api_key: &str) -> GeminiSynthesizer {
    GeminiSynthesizer::new(GeminiConfig {
        api_key: api_key.to_string(),
        model: "tts-model".to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_synthesize_returns_inline_audio() {
    let base = spawn_mock().await;
    let synth = client(&base, API_KEY);

    let payload = synth.synthesize("hello", "Kore").await.unwrap();
    assert_eq!(decode_base64(&payload).unwrap(), b"hello");
}

#[tokio::test]
async fn test_error_statuses_are_labeled() {
    let base = spawn_mock().await;
    let synth = client(&base, API_KEY);

    assert_eq!(
        synth.synthesize("hi", "Busy").await.unwrap_err(),
        SynthesisError::Quota("Resource has been exhausted".to_string())
    );
    assert_eq!(
        synth.synthesize("hi", "Nobody").await.unwrap_err(),
        SynthesisError::InvalidVoice {
            voice_id: "Nobody".to_string(),
            message: "Voice name Nobody is not supported".to_string(),
        }
    );
    assert_eq!(
        synth.synthesize("hi", "Silent").await.unwrap_err(),
        SynthesisError::MissingAudio
    );
}

#[tokio::test]
async fn test_rejected_key_is_service_error() {
    let base = spawn_mock().await;
    let synth = client(&base, "wrong-key");

    assert_eq!(
        synth.synthesize("hi", "Kore").await.unwrap_err(),
        SynthesisError::Service {
            status: 403,
            message: "API key not valid".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let synth = client(&format!("http://{}", addr), API_KEY);
    assert!(matches!(
        synth.synthesize("hi", "Kore").await.unwrap_err(),
        SynthesisError::Network(_)
    ));
}
