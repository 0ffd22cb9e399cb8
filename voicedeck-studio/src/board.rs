//! Text entry board
//!
//! Holds the ordered list of text entries and each entry's generation state.
//! Entries are addressed by position for editing and by a stable id for
//! generation results, so a result that arrives after its entry was removed
//! is discarded instead of landing in the wrong slot.

use crate::clips::ClipHandle;
use serde::Serialize;
use voicedeck_common::events::EntryStatus;
use voicedeck_common::voices::clamp_input_count;
use voicedeck_common::{Error, Result};

/// One text entry
#[derive(Debug)]
pub struct Entry {
    pub id: u64,
    pub text: String,
    pub clip: Option<ClipHandle>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Entry {
    fn blank(id: u64) -> Self {
        Self {
            id,
            text: String::new(),
            clip: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn status(&self) -> EntryStatus {
        if self.is_loading {
            EntryStatus::Loading
        } else if let Some(message) = &self.error {
            EntryStatus::Failed {
                message: message.clone(),
            }
        } else if let Some(clip) = &self.clip {
            EntryStatus::Ready {
                audio_url: clip.url().to_string(),
            }
        } else {
            EntryStatus::Idle
        }
    }
}

/// Serializable snapshot of an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub id: u64,
    pub index: usize,
    pub text: String,
    pub audio_url: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub status: EntryStatus,
}

/// Ordered entries, 1..=MAX_INPUT_COUNT of them
#[derive(Debug)]
pub struct EntryBoard {
    entries: Vec<Entry>,
    next_id: u64,
}

impl EntryBoard {
    /// Board with `count` blank entries (clamped)
    pub fn new(count: usize) -> Self {
        let mut board = Self {
            entries: Vec::new(),
            next_id: 1,
        };
        board.resize(count);
        board
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resize to `count` entries (clamped), keeping existing entries by position.
    ///
    /// Returns the new length. Entries cut off by shrinking release their clips.
    pub fn resize(&mut self, count: usize) -> usize {
        let count = clamp_input_count(count);
        if count < self.entries.len() {
            self.entries.truncate(count);
        }
        while self.entries.len() < count {
            let id = self.next_id;
            self.next_id += 1;
            self.entries.push(Entry::blank(id));
        }
        count
    }

    /// Replace the text at `index`, returning the entry id
    pub fn set_text(&mut self, index: usize, text: String) -> Result<u64> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| Error::NotFound(format!("Entry {} (board has {})", index, len)))?;
        entry.text = text;
        Ok(entry.id)
    }

    pub fn entry(&self, id: u64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn entry_mut(&mut self, id: u64) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn views(&self) -> Vec<EntryView> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| EntryView {
                id: e.id,
                index,
                text: e.text.clone(),
                audio_url: e.clip.as_ref().map(|c| c.url().to_string()),
                is_loading: e.is_loading,
                error: e.error.clone(),
                status: e.status(),
            })
            .collect()
    }

    /// Whether any entry has non-blank text
    pub fn has_text(&self) -> bool {
        self.entries.iter().any(Entry::has_text)
    }

    /// Reset an entry to idle, releasing its clip
    pub fn clear(&mut self, id: u64) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.clip = None;
                entry.error = None;
                entry.is_loading = false;
                true
            }
            None => false,
        }
    }

    /// Mark an entry as loading, releasing any previous clip and error
    pub fn mark_loading(&mut self, id: u64) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.clip = None;
                entry.error = None;
                entry.is_loading = true;
                true
            }
            None => false,
        }
    }

    /// Store a generation outcome for entry `id`.
    ///
    /// Returns the new status, or `None` if the entry no longer exists (the
    /// clip, if any, is released).
    pub fn complete(
        &mut self,
        id: u64,
        outcome: std::result::Result<ClipHandle, String>,
    ) -> Option<EntryStatus> {
        let entry = self.entry_mut(id)?;
        entry.is_loading = false;
        match outcome {
            Ok(clip) => {
                entry.clip = Some(clip);
                entry.error = None;
            }
            Err(message) => {
                entry.clip = None;
                entry.error = Some(message);
            }
        }
        Some(entry.status())
    }
}

impl Default for EntryBoard {
    fn default() -> Self {
        Self::new(voicedeck_common::voices::DEFAULT_INPUT_COUNT)
    }
}
