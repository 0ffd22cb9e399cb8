//! # VoiceDeck Common Library
//!
//! Shared code for the VoiceDeck workspace including:
//! - Audio codec core (base64, WAV container, raw PCM decoding)
//! - Voice catalog and board limits
//! - Event types (StudioEvent enum) and EventBus
//! - Configuration loading
//! - Error types

pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod voices;

pub use codec::{AudioBuffer, WavHeader};
pub use error::{DecodeError, Error, PlaybackError, Result, SynthesisError};
