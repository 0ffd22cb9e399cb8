//! In-memory WAV clip store
//!
//! Generated clips are kept as encoded WAV bytes and served under
//! `/clips/{id}.wav`. A clip lives exactly as long as its [`ClipHandle`]:
//! dropping the handle (entry regenerated, cleared, or removed) releases
//! the bytes.

use axum::body::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use uuid::Uuid;
use voicedeck_common::codec::{decode_base64, encode_wav};
use voicedeck_common::DecodeError;

type ClipMap = RwLock<HashMap<Uuid, Bytes>>;

/// Shared clip storage
#[derive(Clone, Default)]
pub struct ClipStore {
    clips: Arc<ClipMap>,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an already-encoded WAV byte stream
    pub fn register_wav(&self, wav: Vec<u8>) -> ClipHandle {
        let id = Uuid::new_v4();
        let size = wav.len();
        self.clips
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Bytes::from(wav));

        tracing::debug!(clip_id = %id, size, "Clip registered");

        ClipHandle {
            id,
            url: clip_url(&id),
            size,
            store: Arc::downgrade(&self.clips),
        }
    }

    /// Wrap raw 24 kHz mono PCM in a WAV container and store it
    pub fn register_pcm(&self, pcm: &[u8]) -> ClipHandle {
        self.register_wav(encode_wav(pcm))
    }

    /// Decode a base64 PCM payload and store it as WAV
    pub fn register_base64(&self, payload: &str) -> Result<ClipHandle, DecodeError> {
        let pcm = decode_base64(payload)?;
        Ok(self.register_pcm(&pcm))
    }

    pub fn get(&self, id: &Uuid) -> Option<Bytes> {
        self.clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of live clips
    pub fn len(&self) -> usize {
        self.clips.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owning reference to one stored clip
///
/// Not `Clone`: there is exactly one owner per clip.
#[derive(Debug)]
pub struct ClipHandle {
    id: Uuid,
    url: String,
    size: usize,
    store: Weak<ClipMap>,
}

impl ClipHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Relative URL the clip is served under
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Size of the WAV byte stream
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for ClipHandle {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            tracing::debug!(clip_id = %self.id, "Clip released");
        }
    }
}

fn clip_url(id: &Uuid) -> String {
    format!("/clips/{}.wav", id)
}

/// Parse the `{id}.wav` path segment of a clip URL
pub fn parse_clip_id(file: &str) -> Option<Uuid> {
    let stem = file.strip_suffix(".wav").unwrap_or(file);
    Uuid::parse_str(stem).ok()
}
