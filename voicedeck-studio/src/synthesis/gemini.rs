//! Gemini text-to-speech client
//!
//! Calls `POST {base}/v1beta/models/{model}:generateContent` with an audio
//! response modality and a prebuilt voice, and returns the base64 PCM payload
//! found in the first inline-data part of the first candidate.

use super::SpeechSynthesizer;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use voicedeck_common::config::TomlConfig;
use voicedeck_common::SynthesisError;

const USER_AGENT: &str = concat!("VoiceDeck/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`GeminiSynthesizer`]
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Settings from the bootstrap config plus a resolved API key
    pub fn from_toml(config: &TomlConfig, api_key: String) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.api_base_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Gemini API client
pub struct GeminiSynthesizer {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiSynthesizer {
    pub fn new(config: GeminiConfig) -> Result<Self, SynthesisError> {
        if config.api_key.trim().is_empty() {
            return Err(SynthesisError::NotConfigured("API key is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key,
        })
    }

    /// Full generateContent URL this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<String, SynthesisError> {
        tracing::debug!(voice_id, chars = text.chars().count(), "Requesting speech synthesis");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(text, voice_id))
            .send()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_failure(status.as_u16(), &body, voice_id);
            tracing::warn!(status = status.as_u16(), error = %err, "Speech synthesis failed");
            return Err(err);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::Service {
                status: status.as_u16(),
                message: format!("Unreadable response: {}", e),
            })?;

        let audio = extract_audio(parsed)?;
        tracing::info!(voice_id, payload_len = audio.len(), "Speech synthesis successful");
        Ok(audio)
    }
}

/// JSON body of a generateContent request for a single spoken utterance
pub fn request_body(text: &str, voice_id: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice_id }
                }
            }
        }
    })
}

fn extract_audio(response: GenerateContentResponse) -> Result<String, SynthesisError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
        .map(|inline| inline.data)
        .ok_or(SynthesisError::MissingAudio)
}

/// Parse a successful response body and extract its audio payload
pub fn parse_audio_response(body: &str) -> Result<String, SynthesisError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| SynthesisError::Service {
            status: 200,
            message: format!("Unreadable response: {}", e),
        })?;
    extract_audio(parsed)
}

/// Map a non-success HTTP response to a labeled error
pub fn classify_failure(status: u16, body: &str, voice_id: &str) -> SynthesisError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        429 => SynthesisError::Quota(message),
        400 if message.to_lowercase().contains("voice") => SynthesisError::InvalidVoice {
            voice_id: voice_id.to_string(),
            message,
        },
        _ => SynthesisError::Service { status, message },
    }
}
