//! Playback adapter
//!
//! Decodes speech service audio and schedules it on the shared output
//! context. The `play_*` entry points never fail: any decode or playback
//! error is logged and reported only as `false`.

use super::context::SharedOutput;
use std::sync::Arc;
use tracing::{debug, warn};
use voicedeck_common::codec::{decode_base64, decode_pcm16, CHANNELS, SAMPLE_RATE};
use voicedeck_common::{Error, PlaybackError};

pub struct PlaybackAdapter {
    output: Arc<SharedOutput>,
}

impl PlaybackAdapter {
    pub fn new(output: Arc<SharedOutput>) -> Self {
        Self { output }
    }

    /// Decode 24 kHz mono PCM and schedule it for immediate playback.
    ///
    /// A device error or closed context tears down the shared context so the
    /// next call opens a fresh one.
    pub fn try_play_pcm(&self, pcm: &[u8]) -> Result<(), PlaybackError> {
        let context = self.output.get_or_init()?;
        let buffer = decode_pcm16(pcm, SAMPLE_RATE, CHANNELS);
        let frames = buffer.frame_count();

        let result = context.schedule(buffer);
        match &result {
            Ok(()) => debug!(frames, "Playback scheduled"),
            Err(PlaybackError::Device(_) | PlaybackError::ContextClosed) => self.output.shutdown(),
            Err(_) => {}
        }
        result
    }

    /// Decode a base64 PCM payload and schedule it
    pub fn try_play_base64(&self, payload: &str) -> Result<(), Error> {
        let pcm = decode_base64(payload)?;
        self.try_play_pcm(&pcm)?;
        Ok(())
    }

    /// Play raw PCM, returning whether it was scheduled
    pub fn play_pcm(&self, pcm: &[u8]) -> bool {
        match self.try_play_pcm(pcm) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Audio playback failed");
                false
            }
        }
    }

    /// Play a base64 PCM payload, returning whether it was scheduled
    pub fn play_base64(&self, payload: &str) -> bool {
        match self.try_play_base64(payload) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Audio playback failed");
                false
            }
        }
    }
}
