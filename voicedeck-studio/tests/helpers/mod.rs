//! Shared test doubles for studio integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use voicedeck_common::codec::encode_base64;
use voicedeck_common::{AudioBuffer, PlaybackError, SynthesisError};
use voicedeck_studio::audio::{OutputContext, SharedOutput};
use voicedeck_studio::state::StudioState;
use voicedeck_studio::synthesis::SpeechSynthesizer;

/// PCM for samples [1000, -1000, 32767, -32768]
pub fn scenario_pcm() -> Vec<u8> {
    [1000i16, -1000, 32767, -32768]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect()
}

enum Script {
    Fail(SynthesisError),
    Payload(String),
    Panic,
}

/// Speech service double: succeeds with [`scenario_pcm`] unless a text is scripted
#[derive(Default)]
pub struct FakeSynthesizer {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_on(self, text: &str, err: SynthesisError) -> Self {
        self.script(text, Script::Fail(err))
    }

    pub fn payload_on(self, text: &str, payload: &str) -> Self {
        self.script(text, Script::Payload(payload.to_string()))
    }

    pub fn panic_on(self, text: &str) -> Self {
        self.script(text, Script::Panic)
    }

    fn script(self, text: &str, script: Script) -> Self {
        self.scripts.lock().unwrap().insert(text.to_string(), script);
        self
    }

    /// (text, voice) of every call so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of concurrent calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<String, SynthesisError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice_id.to_string()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = match self.scripts.lock().unwrap().get(text) {
            Some(Script::Fail(err)) => Some(Err(err.clone())),
            Some(Script::Payload(payload)) => Some(Ok(payload.clone())),
            Some(Script::Panic) => None,
            None => Some(Ok(encode_base64(&scenario_pcm()))),
        };
        match scripted {
            Some(result) => result,
            None => panic!("scripted panic for {:?}", text),
        }
    }
}

/// Output context double that records scheduled buffers
pub struct RecordingContext {
    pub scheduled: Mutex<Vec<AudioBuffer>>,
    failure: Option<PlaybackError>,
}

impl OutputContext for RecordingContext {
    fn sample_rate(&self) -> u32 {
        24_000
    }

    fn schedule(&self, buffer: AudioBuffer) -> Result<(), PlaybackError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.scheduled.lock().unwrap().push(buffer);
        Ok(())
    }

    fn close(&self) {}
}

/// Shared output whose contexts record what they are given
pub struct RecordingOutput {
    pub output: Arc<SharedOutput>,
    pub context: Arc<RecordingContext>,
    pub opens: Arc<AtomicUsize>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn failing(err: PlaybackError) -> Self {
        Self::build(Some(err))
    }

    fn build(failure: Option<PlaybackError>) -> Self {
        let context = Arc::new(RecordingContext {
            scheduled: Mutex::new(Vec::new()),
            failure,
        });
        let opens = Arc::new(AtomicUsize::new(0));

        let factory_context = Arc::clone(&context);
        let factory_opens = Arc::clone(&opens);
        let output = Arc::new(SharedOutput::new(Box::new(move || {
            factory_opens.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&factory_context) as Arc<dyn OutputContext>)
        })));

        Self {
            output,
            context,
            opens,
        }
    }

    pub fn scheduled_count(&self) -> usize {
        self.context.scheduled.lock().unwrap().len()
    }
}

pub fn studio(synth: Arc<FakeSynthesizer>, output: &RecordingOutput) -> Arc<StudioState> {
    Arc::new(StudioState::new(synth, Arc::clone(&output.output), "Kore").unwrap())
}
