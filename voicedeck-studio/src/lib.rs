//! VoiceDeck Studio library
//!
//! Multi-entry text-to-speech studio: a board of text entries, batch
//! generation through a speech service into playable WAV clips, and voice
//! preview on the local audio output.

pub mod api;
pub mod audio;
pub mod board;
pub mod clips;
pub mod error;
pub mod generation;
pub mod preview;
pub mod state;
pub mod synthesis;

pub use error::{ApiError, ApiResult};
pub use state::StudioState;
