//! Raw PCM → normalized float buffer
//!
//! Interprets a byte sequence as interleaved little-endian signed 16-bit
//! samples and splits it into one `f32` sequence per channel, each sample
//! scaled by `1 / 32768` into `[-1.0, 1.0)`.
//!
//! # Truncation
//!
//! Input that does not divide into whole frames is accepted. The sample count
//! is `floor(len / 2)` and the frame count is `floor(samples / channels)`; a
//! trailing odd byte and any trailing samples that do not complete a frame
//! across all channels are dropped. Decoding never fails.

/// Normalized multi-channel audio ready for an output context.
///
/// Channels are stored planar: `channels[c][i]` is frame `i` of channel `c`.
/// Every channel has the same length (the frame count).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Buffer of `frame_count` silent frames on `channel_count` channels
    pub fn silent(channel_count: u16, frame_count: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frame_count]; channel_count as usize],
            sample_rate,
        }
    }

    /// Build a buffer from planar channel data.
    ///
    /// Returns `None` if the channels differ in length or there are more than
    /// `u16::MAX` of them.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Option<Self> {
        if channels.len() > u16::MAX as usize {
            return None;
        }
        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if channels.iter().any(|c| c.len() != frames) {
            return None;
        }
        Some(Self { channels, sample_rate })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Samples of one channel, `None` if out of range
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Mutable samples of one channel, `None` if out of range
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frame_count() as u64 * 1000) / self.sample_rate as u64
    }

    /// Interleave into an output layout of `out_channels` channels.
    ///
    /// Mono input is duplicated to every output channel. Otherwise output
    /// channel `k` carries input channel `k`, and output channels beyond the
    /// input's count are silent.
    pub fn interleave(&self, out_channels: u16) -> Vec<f32> {
        let out_channels = out_channels as usize;
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * out_channels);

        for i in 0..frames {
            for k in 0..out_channels {
                let sample = match self.channels.len() {
                    0 => 0.0,
                    1 => self.channels[0][i],
                    n if k < n => self.channels[k][i],
                    _ => 0.0,
                };
                out.push(sample);
            }
        }
        out
    }
}

/// Decode interleaved little-endian 16-bit PCM into a normalized buffer.
///
/// # Arguments
/// - `bytes`: raw PCM bytes
/// - `sample_rate`: declared sample rate, stored as buffer metadata
/// - `channel_count`: number of interleaved channels
///
/// A channel count of zero yields an empty buffer with no channels.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channel_count: u16) -> AudioBuffer {
    let channels = channel_count as usize;
    if channels == 0 {
        return AudioBuffer {
            channels: Vec::new(),
            sample_rate,
        };
    }

    let total_samples = bytes.len() / 2;
    let frame_count = total_samples / channels;

    let mut planes: Vec<Vec<f32>> = (0..channels)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();
    for frame in bytes.chunks_exact(2 * channels).take(frame_count) {
        for (plane, sample) in planes.iter_mut().zip(frame.chunks_exact(2)) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            plane.push(value as f32 / 32768.0);
        }
    }

    AudioBuffer {
        channels: planes,
        sample_rate,
    }
}
