//! Event types for the VoiceDeck event system
//!
//! Provides the shared event definitions and the EventBus used to fan them
//! out to SSE clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Display status of one text entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryStatus {
    /// No audio and no error
    Idle,
    /// Synthesis request in flight
    Loading,
    /// Audio clip available at `audio_url`
    Ready { audio_url: String },
    /// Generation failed; `message` is shown to the user
    Failed { message: String },
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Idle => write!(f, "Idle"),
            EntryStatus::Loading => write!(f, "Loading"),
            EntryStatus::Ready { .. } => write!(f, "Ready"),
            EntryStatus::Failed { .. } => write!(f, "Failed"),
        }
    }
}

/// VoiceDeck event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StudioEvent {
    /// Number of text entries changed
    EntriesResized {
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// One entry changed status
    EntryUpdated {
        entry_id: u64,
        status: EntryStatus,
        timestamp: DateTime<Utc>,
    },

    /// Selected voice changed
    VoiceSelected {
        voice_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Batch generation started
    GenerationStarted {
        voice_id: String,
        /// Entries with non-blank text
        entry_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Every task of a batch generation finished
    GenerationCompleted {
        ready: usize,
        failed: usize,
        skipped: usize,
        timestamp: DateTime<Utc>,
    },

    /// Voice preview requested
    PreviewStarted {
        voice_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Voice preview finished (`played` is false if audio output failed)
    PreviewFinished {
        voice_id: String,
        played: bool,
        timestamp: DateTime<Utc>,
    },
}

impl StudioEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            StudioEvent::EntriesResized { .. } => "EntriesResized",
            StudioEvent::EntryUpdated { .. } => "EntryUpdated",
            StudioEvent::VoiceSelected { .. } => "VoiceSelected",
            StudioEvent::GenerationStarted { .. } => "GenerationStarted",
            StudioEvent::GenerationCompleted { .. } => "GenerationCompleted",
            StudioEvent::PreviewStarted { .. } => "PreviewStarted",
            StudioEvent::PreviewFinished { .. } => "PreviewFinished",
        }
    }
}

/// Central event distribution bus
///
/// Thin wrapper around a tokio broadcast channel. Slow subscribers lag and
/// lose the oldest events rather than blocking emitters.
pub struct EventBus {
    tx: broadcast::Sender<StudioEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: StudioEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
