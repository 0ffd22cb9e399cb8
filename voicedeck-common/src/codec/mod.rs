//! Audio codec core
//!
//! Converts the speech service's output format (base64 text carrying
//! little-endian 16-bit mono PCM at 24 kHz) into:
//! - a canonical WAV byte stream for clip playback ([`wav`])
//! - a normalized per-channel float buffer for immediate playback ([`pcm`])
//!
//! All functions here are pure and synchronous: each call works on its own
//! input and allocates a fresh output, so they can run concurrently from any
//! number of tasks without coordination.

pub mod base64;
pub mod pcm;
pub mod wav;

pub use self::base64::{decode_base64, encode_base64};
pub use pcm::{decode_pcm16, AudioBuffer};
pub use wav::{encode_wav, WavHeader, WAV_HEADER_LEN};

/// Sample rate of the speech service's PCM output (Hz)
pub const SAMPLE_RATE: u32 = 24_000;

/// Channel count of the speech service's PCM output
pub const CHANNELS: u16 = 1;

/// Bits per sample of the speech service's PCM output
pub const BITS_PER_SAMPLE: u16 = 16;
