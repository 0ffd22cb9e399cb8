//! Audio playback
//!
//! - [`context`]: the output context trait and the process-wide shared context
//! - [`output`]: cpal-backed output context
//! - [`adapter`]: decode-and-play entry points used by voice preview

pub mod adapter;
pub mod context;
pub mod output;

pub use adapter::PlaybackAdapter;
pub use context::{OutputContext, OutputFactory, SharedOutput};
pub use output::CpalOutput;
