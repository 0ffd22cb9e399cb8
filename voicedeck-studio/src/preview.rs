//! Voice preview
//!
//! Speaks a fixed phrase with the requested voice on the shared output.
//! Only one preview runs at a time; the gate is held from the synthesis
//! request until the audio has been scheduled.

use crate::audio::PlaybackAdapter;
use crate::synthesis::SpeechSynthesizer;
use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};
use voicedeck_common::events::{EventBus, StudioEvent};
use voicedeck_common::voices::{find_voice, PREVIEW_PHRASE};
use voicedeck_common::{Error, Result};

/// Allows at most one preview in flight
#[derive(Default)]
pub struct PreviewGate {
    current: Mutex<Option<String>>,
}

/// Held while a preview runs; releases the gate on drop
pub struct PreviewPermit<'a> {
    gate: &'a PreviewGate,
}

impl PreviewGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate for `voice_id`, or return the voice currently previewing
    pub fn try_acquire(&self, voice_id: &str) -> std::result::Result<PreviewPermit<'_>, String> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = current.as_ref() {
            return Err(active.clone());
        }
        *current = Some(voice_id.to_string());
        Ok(PreviewPermit { gate: self })
    }

    /// Voice currently being previewed
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for PreviewPermit<'_> {
    fn drop(&mut self) {
        *self
            .gate
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Result of a preview request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewOutcome {
    pub voice_id: String,
    /// False if the audio could not be played; the failure is only logged
    pub played: bool,
}

pub struct PreviewService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    adapter: Arc<PlaybackAdapter>,
    gate: Arc<PreviewGate>,
    events: Arc<EventBus>,
}

impl PreviewService {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        adapter: Arc<PlaybackAdapter>,
        gate: Arc<PreviewGate>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            synthesizer,
            adapter,
            gate,
            events,
        }
    }

    /// Voice currently being previewed
    pub fn previewing(&self) -> Option<String> {
        self.gate.current()
    }

    /// Synthesize the preview phrase with `voice_id` and play it.
    ///
    /// # Errors
    /// - `InvalidInput` for a voice outside the catalog
    /// - `Busy` while another preview is in flight
    /// - `Synthesis` / `Decode` if no audio could be obtained
    pub async fn preview(&self, voice_id: &str) -> Result<PreviewOutcome> {
        let voice = find_voice(voice_id)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown voice '{}'", voice_id)))?;

        let _permit = self.gate.try_acquire(voice.id).map_err(|active| {
            Error::Busy(format!("Preview of '{}' already in progress", active))
        })?;

        info!(voice_id = voice.id, "Previewing voice");
        self.events.emit_lossy(StudioEvent::PreviewStarted {
            voice_id: voice.id.to_string(),
            timestamp: Utc::now(),
        });

        let payload = match self.synthesizer.synthesize(PREVIEW_PHRASE, voice.id).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(voice_id = voice.id, error = %e, "Preview synthesis failed");
                self.finish(voice.id, false);
                return Err(e.into());
            }
        };

        let adapter = Arc::clone(&self.adapter);
        let played = tokio::task::spawn_blocking(move || adapter.play_base64(&payload))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Playback task failed");
                false
            });

        self.finish(voice.id, played);
        Ok(PreviewOutcome {
            voice_id: voice.id.to_string(),
            played,
        })
    }

    fn finish(&self, voice_id: &str, played: bool) {
        self.events.emit_lossy(StudioEvent::PreviewFinished {
            voice_id: voice_id.to_string(),
            played,
            timestamp: Utc::now(),
        });
    }
}
