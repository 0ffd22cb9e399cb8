//! Batch speech generation
//!
//! One task per non-blank entry. Each task synthesizes its text, turns the
//! payload into a stored WAV clip and writes the outcome into its own board
//! slot. Failures stay in the slot they happened in: a failed or panicked
//! task never touches its siblings.

use crate::board::EntryBoard;
use crate::clips::{ClipHandle, ClipStore};
use crate::preview::PreviewGate;
use crate::synthesis::SpeechSynthesizer;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use voicedeck_common::codec::{decode_base64, encode_wav};
use voicedeck_common::events::{EntryStatus, EventBus, StudioEvent};
use voicedeck_common::voices::find_voice;
use voicedeck_common::{Error, Result};

/// Outcome counts of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub ready: usize,
    pub failed: usize,
    /// Blank entries, plus entries removed while their request was in flight
    pub skipped: usize,
}

/// Resets the running flag when a batch ends, however it ends
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs batch generation against the shared board
pub struct Generator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    clips: ClipStore,
    board: Arc<RwLock<EntryBoard>>,
    events: Arc<EventBus>,
    preview_gate: Arc<PreviewGate>,
    running: AtomicBool,
}

impl Generator {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        clips: ClipStore,
        board: Arc<RwLock<EntryBoard>>,
        events: Arc<EventBus>,
        preview_gate: Arc<PreviewGate>,
    ) -> Self {
        Self {
            synthesizer,
            clips,
            board,
            events,
            preview_gate,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Generate audio for every non-blank entry with `voice_id`.
    ///
    /// Blank entries are reset to idle. Returns once every task has finished.
    ///
    /// # Errors
    /// - `InvalidInput` if the voice is unknown or no entry has text
    /// - `Busy` if another batch or a voice preview is still running
    pub async fn generate_all(&self, voice_id: &str) -> Result<GenerationReport> {
        if find_voice(voice_id).is_none() {
            return Err(Error::InvalidInput(format!("Unknown voice '{}'", voice_id)));
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy("Generation already in progress".to_string()));
        }
        let _guard = RunningGuard(&self.running);

        if let Some(voice) = self.preview_gate.current() {
            return Err(Error::Busy(format!(
                "Preview of '{}' in progress, try again when it finishes",
                voice
            )));
        }

        let mut report = GenerationReport::default();
        let mut jobs = Vec::new();
        {
            let mut board = self.board.write().await;
            if !board.has_text() {
                return Err(Error::InvalidInput("No entry has text".to_string()));
            }

            let snapshot: Vec<(u64, String, bool)> = board
                .entries()
                .iter()
                .map(|e| (e.id, e.text.clone(), e.has_text()))
                .collect();

            for (id, text, has_text) in snapshot {
                if has_text {
                    board.mark_loading(id);
                    self.emit_status(id, EntryStatus::Loading);
                    jobs.push((id, text));
                } else {
                    board.clear(id);
                    self.emit_status(id, EntryStatus::Idle);
                    report.skipped += 1;
                }
            }
        }

        info!(voice_id, entries = jobs.len(), "Starting batch generation");
        self.events.emit_lossy(StudioEvent::GenerationStarted {
            voice_id: voice_id.to_string(),
            entry_count: jobs.len(),
            timestamp: Utc::now(),
        });

        let ids: Vec<u64> = jobs.iter().map(|(id, _)| *id).collect();
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|(id, text)| {
                let synthesizer = Arc::clone(&self.synthesizer);
                let clips = self.clips.clone();
                let board = Arc::clone(&self.board);
                let events = Arc::clone(&self.events);
                let voice_id = voice_id.to_string();

                tokio::spawn(async move {
                    let outcome = synthesize_clip(synthesizer.as_ref(), &clips, &text, &voice_id)
                        .await
                        .map_err(|e| {
                            warn!(entry_id = id, error = %e, "Entry generation failed");
                            e.to_string()
                        });
                    let status = board.write().await.complete(id, outcome);
                    if let Some(status) = &status {
                        events.emit_lossy(StudioEvent::EntryUpdated {
                            entry_id: id,
                            status: status.clone(),
                            timestamp: Utc::now(),
                        });
                    }
                    status
                })
            })
            .collect();

        for (id, joined) in ids.into_iter().zip(join_all(handles).await) {
            let status = match joined {
                Ok(status) => status,
                Err(e) => {
                    error!(entry_id = id, error = %e, "Generation task aborted");
                    let status = self
                        .board
                        .write()
                        .await
                        .complete(id, Err(format!("Generation task failed: {}", e)));
                    if let Some(status) = &status {
                        self.emit_status(id, status.clone());
                    }
                    status
                }
            };

            match status {
                Some(EntryStatus::Ready { .. }) => report.ready += 1,
                Some(EntryStatus::Failed { .. }) => report.failed += 1,
                _ => {
                    debug!(entry_id = id, "Entry removed before its result arrived");
                    report.skipped += 1;
                }
            }
        }

        info!(
            ready = report.ready,
            failed = report.failed,
            skipped = report.skipped,
            "Batch generation complete"
        );
        self.events.emit_lossy(StudioEvent::GenerationCompleted {
            ready: report.ready,
            failed: report.failed,
            skipped: report.skipped,
            timestamp: Utc::now(),
        });

        Ok(report)
    }

    fn emit_status(&self, entry_id: u64, status: EntryStatus) {
        self.events.emit_lossy(StudioEvent::EntryUpdated {
            entry_id,
            status,
            timestamp: Utc::now(),
        });
    }
}

/// Synthesize one text and store the result as a WAV clip
pub async fn synthesize_clip(
    synthesizer: &dyn SpeechSynthesizer,
    clips: &ClipStore,
    text: &str,
    voice_id: &str,
) -> Result<ClipHandle> {
    let payload = synthesizer.synthesize(text, voice_id).await?;
    let clip = clips.register_base64(&payload)?;
    debug!(clip_id = %clip.id(), size = clip.size(), "Clip ready");
    Ok(clip)
}

/// Synthesize every text concurrently and return each as WAV bytes, in order.
///
/// Blank texts are not sent and come back as `InvalidInput`.
pub async fn render_all(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    texts: Vec<String>,
    voice_id: &str,
) -> Vec<Result<Vec<u8>>> {
    let handles: Vec<_> = texts
        .into_iter()
        .map(|text| {
            let synthesizer = Arc::clone(&synthesizer);
            let voice_id = voice_id.to_string();
            tokio::spawn(async move {
                if text.trim().is_empty() {
                    return Err(Error::InvalidInput("Text is blank".to_string()));
                }
                let payload = synthesizer.synthesize(&text, &voice_id).await?;
                let pcm = decode_base64(&payload)?;
                Ok(encode_wav(&pcm))
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| {
            joined.unwrap_or_else(|e| Err(Error::Internal(format!("Render task failed: {}", e))))
        })
        .collect()
}
