//! Common error types for VoiceDeck
//!
//! Three error kinds cross component boundaries:
//! - [`DecodeError`]: malformed base64 audio payload
//! - [`SynthesisError`]: the remote speech service call failed
//! - [`PlaybackError`]: the audio output device or context failed
//!
//! [`Error`] aggregates them with the ambient failures (I/O, configuration).

use thiserror::Error;

/// Common result type for VoiceDeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Audio payload could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input is not valid standard-alphabet base64
    #[error("Invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Speech synthesis collaborator failure
///
/// Surfaces to the per-entry caller and is rendered as user-visible text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("Speech service unreachable: {0}")]
    Network(String),

    /// Rate limit or quota exhausted
    #[error("Speech service quota exceeded: {0}")]
    Quota(String),

    /// Service rejected the requested voice
    #[error("Invalid voice '{voice_id}': {message}")]
    InvalidVoice { voice_id: String, message: String },

    /// Any other non-success response
    #[error("Speech service error {status}: {message}")]
    Service { status: u16, message: String },

    /// Response was well-formed but carried no audio part
    #[error("Speech service returned no audio")]
    MissingAudio,

    /// Client is missing credentials or other required settings
    #[error("Speech service not configured: {0}")]
    NotConfigured(String),
}

/// Audio output failure
///
/// Logged and swallowed at the playback boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// No usable output device
    #[error("No audio output device available: {0}")]
    DeviceUnavailable(String),

    /// The device or its stream reported an error
    #[error("Audio output device error: {0}")]
    Device(String),

    /// The output context was torn down
    #[error("Audio output context is closed")]
    ContextClosed,

    /// Buffer cannot be played by this context
    #[error("Unsupported audio buffer: {0}")]
    UnsupportedBuffer(String),
}

/// Common error types across VoiceDeck crates
#[derive(Error, Debug)]
pub enum Error {
    /// Audio payload decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Speech synthesis error
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Audio output error
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation already in progress
    #[error("Busy: {0}")]
    Busy(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
