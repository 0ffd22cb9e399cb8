//! Audio output using cpal
//!
//! The cpal stream is owned by a dedicated audio thread for its whole life,
//! since streams are not `Send` on every host. Scheduled buffers are
//! interleaved into the device's channel layout and appended to a shared
//! sample queue; the stream callback drains the queue and plays silence
//! when it is empty.

use super::context::OutputContext;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};
use voicedeck_common::codec::SAMPLE_RATE;
use voicedeck_common::{AudioBuffer, PlaybackError};

type SampleQueue = Arc<Mutex<VecDeque<f32>>>;

/// Output context on a cpal device, fixed at 24 kHz
pub struct CpalOutput {
    queue: SampleQueue,
    channels: u16,
    device_name: String,
    /// Stream error flag - set by the error callback
    error_flag: Arc<AtomicBool>,
    error_count: Arc<AtomicU32>,
    closed: AtomicBool,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

/// Parameters the audio thread reports back once its stream is playing
struct StreamInfo {
    channels: u16,
    device_name: String,
}

impl CpalOutput {
    /// List available audio output devices.
    pub fn list_devices() -> Result<Vec<String>, PlaybackError> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| PlaybackError::DeviceUnavailable(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open an output device and start its stream.
    ///
    /// A named device that cannot be found falls back to the default device.
    ///
    /// # Errors
    /// - `DeviceUnavailable` if no device exists or none supports 24 kHz
    /// - `Device` if the stream cannot be built or started
    pub fn open(device_name: Option<String>) -> Result<Self, PlaybackError> {
        let queue: SampleQueue = Arc::new(Mutex::new(VecDeque::new()));
        let error_flag = Arc::new(AtomicBool::new(false));
        let error_count = Arc::new(AtomicU32::new(0));

        let (ready_tx, ready_rx) = mpsc::channel::<Result<StreamInfo, PlaybackError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = {
            let queue = Arc::clone(&queue);
            let error_flag = Arc::clone(&error_flag);
            let error_count = Arc::clone(&error_count);

            std::thread::Builder::new()
                .name("voicedeck-audio".to_string())
                .spawn(move || {
                    let started = start_stream(device_name, queue, error_flag, error_count);
                    let stream = match started {
                        Ok((stream, stream_info)) => {
                            let _ = ready_tx.send(Ok(stream_info));
                            stream
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };

                    // Returns on an explicit shutdown or when the owner is dropped
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    debug!("Audio thread exiting");
                })
                .map_err(|e| PlaybackError::Device(format!("Failed to spawn audio thread: {}", e)))?
        };

        let stream_info = ready_rx
            .recv()
            .map_err(|_| PlaybackError::Device("Audio thread exited during startup".to_string()))??;

        info!(
            device = %stream_info.device_name,
            channels = stream_info.channels,
            sample_rate = SAMPLE_RATE,
            "Audio stream started successfully"
        );

        Ok(Self {
            queue,
            channels: stream_info.channels,
            device_name: stream_info.device_name,
            error_flag,
            error_count,
            closed: AtomicBool::new(false),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            thread: Mutex::new(Some(thread)),
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Device channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl OutputContext for CpalOutput {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn schedule(&self, buffer: AudioBuffer) -> Result<(), PlaybackError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PlaybackError::ContextClosed);
        }
        if self.error_flag.load(Ordering::SeqCst) {
            return Err(PlaybackError::Device(format!(
                "Stream on '{}' reported {} error(s)",
                self.device_name,
                self.error_count.load(Ordering::SeqCst)
            )));
        }
        if buffer.channel_count() == 0 {
            return Err(PlaybackError::UnsupportedBuffer(
                "Buffer has no channels".to_string(),
            ));
        }
        if buffer.sample_rate() != SAMPLE_RATE {
            return Err(PlaybackError::UnsupportedBuffer(format!(
                "Buffer sample rate {} Hz, output runs at {} Hz",
                buffer.sample_rate(),
                SAMPLE_RATE
            )));
        }

        let samples = buffer.interleave(self.channels);
        debug!(
            frames = buffer.frame_count(),
            duration_ms = buffer.duration_ms(),
            "Scheduling buffer"
        );
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(samples);
        Ok(())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(tx) = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = tx.send(());
        }
        if let Some(handle) = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            if handle.join().is_err() {
                warn!("Audio thread panicked during shutdown");
            }
        }
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        info!(device = %self.device_name, "Audio stream stopped");
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Runs on the audio thread: select device and config, build and play the stream
fn start_stream(
    device_name: Option<String>,
    queue: SampleQueue,
    error_flag: Arc<AtomicBool>,
    error_count: Arc<AtomicU32>,
) -> Result<(Stream, StreamInfo), PlaybackError> {
    let (device, device_name) = select_device(device_name.as_deref())?;
    let (config, sample_format) = get_best_config(&device)?;

    debug!(
        "Audio config: sample_rate={}, channels={}, format={:?}",
        config.sample_rate.0, config.channels, sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, queue, error_flag, error_count)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, queue, error_flag, error_count)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, queue, error_flag, error_count)?,
        sample_format => {
            return Err(PlaybackError::Device(format!(
                "Unsupported sample format: {:?}",
                sample_format
            )));
        }
    };

    stream
        .play()
        .map_err(|e| PlaybackError::Device(format!("Failed to start stream: {}", e)))?;

    Ok((
        stream,
        StreamInfo {
            channels: config.channels,
            device_name,
        },
    ))
}

fn select_device(requested: Option<&str>) -> Result<(Device, String), PlaybackError> {
    let host = cpal::default_host();

    if let Some(name) = requested {
        let mut devices = host
            .output_devices()
            .map_err(|e| PlaybackError::DeviceUnavailable(format!("Failed to enumerate devices: {}", e)))?;

        if let Some(device) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
            info!("Found requested audio device: {}", name);
            return Ok((device, name.to_string()));
        }
        warn!("Requested device '{}' not found, falling back to default device", name);
    }

    let device = host.default_output_device().ok_or_else(|| {
        PlaybackError::DeviceUnavailable("No default output device found".to_string())
    })?;
    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    info!("Using default audio device: {}", name);
    Ok((device, name))
}

/// Pick a 24 kHz configuration, preferring f32 samples, then i16, then u16
fn get_best_config(device: &Device) -> Result<(StreamConfig, SampleFormat), PlaybackError> {
    let ranges: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| PlaybackError::Device(format!("Failed to get device configs: {}", e)))?
        .filter(|range| {
            range.min_sample_rate().0 <= SAMPLE_RATE && range.max_sample_rate().0 >= SAMPLE_RATE
        })
        .collect();

    for format in [SampleFormat::F32, SampleFormat::I16, SampleFormat::U16] {
        if let Some(range) = ranges.iter().find(|r| r.sample_format() == format) {
            let config = range
                .clone()
                .with_sample_rate(cpal::SampleRate(SAMPLE_RATE))
                .config();
            return Ok((config, format));
        }
    }

    Err(PlaybackError::DeviceUnavailable(format!(
        "Device has no {} Hz output configuration",
        SAMPLE_RATE
    )))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    queue: SampleQueue,
    error_flag: Arc<AtomicBool>,
    error_count: Arc<AtomicU32>,
) -> Result<Stream, PlaybackError>
where
    T: SizedSample + FromSample<f32>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut queue = queue.lock().unwrap_or_else(PoisonError::into_inner);
                for sample in data.iter_mut() {
                    let value = queue.pop_front().unwrap_or(0.0).clamp(-1.0, 1.0);
                    *sample = <T as FromSample<f32>>::from_sample_(value);
                }
            },
            move |err| {
                error!("Audio stream error: {}", err);
                error_flag.store(true, Ordering::SeqCst);
                error_count.fetch_add(1, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| PlaybackError::Device(format!("Failed to build stream: {}", e)))
}
