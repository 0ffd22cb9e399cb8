//! Speech synthesis collaborator
//!
//! The studio only knows the collaborator's contract: text and a voice id in,
//! base64-encoded 16-bit mono 24 kHz PCM out. Implementations are injected as
//! `Arc<dyn SpeechSynthesizer>`.

pub mod gemini;

pub use gemini::{GeminiConfig, GeminiSynthesizer};

use async_trait::async_trait;
use voicedeck_common::SynthesisError;

/// Text-to-speech service
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice_id`, returning base64-encoded PCM.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<String, SynthesisError>;
}

/// Stand-in used when no API key is configured.
///
/// Every call fails with [`SynthesisError::NotConfigured`], so the service
/// can still start and report the problem per entry.
pub struct UnconfiguredSynthesizer {
    reason: String,
}

impl UnconfiguredSynthesizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for UnconfiguredSynthesizer {
    async fn synthesize(&self, _text: &str, _voice_id: &str) -> Result<String, SynthesisError> {
        Err(SynthesisError::NotConfigured(self.reason.clone()))
    }
}
