//! Shared studio state
//!
//! Everything the HTTP handlers touch. The board sits behind a tokio
//! `RwLock` because generation tasks write to it across await points.

use crate::audio::{PlaybackAdapter, SharedOutput};
use crate::board::EntryBoard;
use crate::clips::ClipStore;
use crate::generation::Generator;
use crate::preview::{PreviewGate, PreviewService};
use crate::synthesis::SpeechSynthesizer;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use voicedeck_common::events::{EventBus, StudioEvent};
use voicedeck_common::voices::{find_voice, DEFAULT_INPUT_COUNT};
use voicedeck_common::{Error, Result};

pub struct StudioState {
    pub board: Arc<RwLock<EntryBoard>>,
    pub selected_voice: RwLock<String>,
    pub clips: ClipStore,
    pub events: Arc<EventBus>,
    pub generator: Generator,
    pub preview: PreviewService,
    pub output: Arc<SharedOutput>,
}

impl StudioState {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output: Arc<SharedOutput>,
        default_voice: &str,
    ) -> Result<Self> {
        let voice = find_voice(default_voice)
            .ok_or_else(|| Error::Config(format!("Unknown default voice '{}'", default_voice)))?;

        let board = Arc::new(RwLock::new(EntryBoard::new(DEFAULT_INPUT_COUNT)));
        let clips = ClipStore::new();
        let events = Arc::new(EventBus::default());
        let adapter = Arc::new(PlaybackAdapter::new(Arc::clone(&output)));
        let preview_gate = Arc::new(PreviewGate::new());

        Ok(Self {
            generator: Generator::new(
                Arc::clone(&synthesizer),
                clips.clone(),
                Arc::clone(&board),
                Arc::clone(&events),
                Arc::clone(&preview_gate),
            ),
            preview: PreviewService::new(
                synthesizer,
                adapter,
                preview_gate,
                Arc::clone(&events),
            ),
            board,
            selected_voice: RwLock::new(voice.id.to_string()),
            clips,
            events,
            output,
        })
    }

    pub async fn selected_voice(&self) -> String {
        self.selected_voice.read().await.clone()
    }

    /// Select a catalog voice for subsequent generations
    pub async fn select_voice(&self, voice_id: &str) -> Result<()> {
        let voice = find_voice(voice_id)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown voice '{}'", voice_id)))?;

        *self.selected_voice.write().await = voice.id.to_string();
        self.events.emit_lossy(StudioEvent::VoiceSelected {
            voice_id: voice.id.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Resize the board, returning the clamped count
    pub async fn resize_entries(&self, count: usize) -> usize {
        let count = self.board.write().await.resize(count);
        self.events.emit_lossy(StudioEvent::EntriesResized {
            count,
            timestamp: Utc::now(),
        });
        count
    }
}
