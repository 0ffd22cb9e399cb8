//! Output context abstraction and the process-wide shared context

use super::output::CpalOutput;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;
use voicedeck_common::{AudioBuffer, PlaybackError};

/// An open audio output that plays buffers immediately
pub trait OutputContext: Send + Sync {
    /// Sample rate buffers must carry to be scheduled
    fn sample_rate(&self) -> u32;

    /// Queue `buffer` for one-shot playback starting as soon as possible
    fn schedule(&self, buffer: AudioBuffer) -> Result<(), PlaybackError>;

    /// Stop output and release the device. Idempotent.
    fn close(&self);
}

/// Opens a new output context
pub type OutputFactory = Box<dyn Fn() -> Result<Arc<dyn OutputContext>, PlaybackError> + Send + Sync>;

/// Lazily created output context shared by the whole process.
///
/// The first [`get_or_init`](Self::get_or_init) opens the context; later calls
/// return the same instance until [`shutdown`](Self::shutdown) tears it down.
pub struct SharedOutput {
    factory: OutputFactory,
    slot: Mutex<Option<Arc<dyn OutputContext>>>,
}

impl SharedOutput {
    pub fn new(factory: OutputFactory) -> Self {
        Self {
            factory,
            slot: Mutex::new(None),
        }
    }

    /// Shared output backed by a cpal device (`None` = default device)
    pub fn cpal(device_name: Option<String>) -> Self {
        Self::new(Box::new(move || {
            let output = CpalOutput::open(device_name.clone())?;
            Ok(Arc::new(output) as Arc<dyn OutputContext>)
        }))
    }

    /// Return the live context, opening it on first use.
    ///
    /// A failed open leaves the slot empty so the next call retries.
    pub fn get_or_init(&self) -> Result<Arc<dyn OutputContext>, PlaybackError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(context) = slot.as_ref() {
            return Ok(Arc::clone(context));
        }

        let context = (self.factory)()?;
        info!(sample_rate = context.sample_rate(), "Audio output context opened");
        *slot = Some(Arc::clone(&context));
        Ok(context)
    }

    /// Close and drop the live context, if any
    pub fn shutdown(&self) {
        let context = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(context) = context {
            context.close();
            info!("Audio output context closed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
