//! Canonical WAV container encoder
//!
//! Wraps raw 16-bit mono PCM in the fixed 44-byte RIFF/WAVE header so the
//! result can be handed to any standard audio player.
//!
//! # Layout
//!
//! | Offset | Size | Field                               |
//! |--------|------|-------------------------------------|
//! | 0      | 4    | `"RIFF"`                            |
//! | 4      | 4    | `36 + data_size` (u32 LE)           |
//! | 8      | 4    | `"WAVE"`                            |
//! | 12     | 4    | `"fmt "`                            |
//! | 16     | 4    | `16` fmt chunk size (u32 LE)        |
//! | 20     | 2    | `1` PCM format tag (u16 LE)         |
//! | 22     | 2    | channel count (u16 LE)              |
//! | 24     | 4    | sample rate (u32 LE)                |
//! | 28     | 4    | byte rate (u32 LE)                  |
//! | 32     | 2    | block align (u16 LE)                |
//! | 34     | 2    | bits per sample (u16 LE)            |
//! | 36     | 4    | `"data"`                            |
//! | 40     | 4    | `data_size` (u32 LE)                |
//! | 44     | ..   | PCM bytes, copied unchanged         |

use super::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use crate::error::{Error, Result};

/// Length of the canonical WAV header in bytes
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Header fields of a canonical PCM WAV container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Length of the PCM payload in bytes
    pub data_size: u32,
}

impl WavHeader {
    /// Header for a PCM payload in the speech service's format
    /// (24000 Hz, mono, 16-bit).
    ///
    /// Payloads too long for the 32-bit size fields saturate at `u32::MAX`.
    pub fn for_pcm(data_len: usize) -> Self {
        Self {
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: BITS_PER_SAMPLE,
            data_size: u32::try_from(data_len).unwrap_or(u32::MAX),
        }
    }

    /// `sample_rate * channels * bits_per_sample / 8`, saturating at `u32::MAX`
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate
            .saturating_mul(self.channels as u32)
            .saturating_mul(self.bits_per_sample as u32 / 8)
    }

    /// `channels * bits_per_sample / 8`, saturating at `u16::MAX`
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bits_per_sample / 8)
    }

    /// Byte rate and block align, or `None` if either overflows its field
    fn checked_rates(&self) -> Option<(u32, u16)> {
        let byte_rate = self
            .sample_rate
            .checked_mul(self.channels as u32)?
            .checked_mul(self.bits_per_sample as u32 / 8)?;
        let block_align = self.channels.checked_mul(self.bits_per_sample / 8)?;
        Some((byte_rate, block_align))
    }

    /// Value of the RIFF chunk size field
    pub fn riff_size(&self) -> u32 {
        self.data_size.saturating_add(36)
    }

    /// Duration of the payload in milliseconds
    pub fn duration_ms(&self) -> u64 {
        let byte_rate = self.byte_rate() as u64;
        if byte_rate == 0 {
            return 0;
        }
        self.data_size as u64 * 1000 / byte_rate
    }

    /// Serialize the header to its fixed 44-byte form
    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut out = [0u8; WAV_HEADER_LEN];

        // RIFF chunk descriptor
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.riff_size().to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());

        // data sub-chunk
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());

        out
    }

    /// Read back the header of a canonical WAV byte stream.
    ///
    /// Only the exact layout produced by [`encode_wav`] is accepted: a PCM
    /// `fmt ` chunk of size 16 immediately followed by the `data` chunk.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] if the stream is shorter than 44 bytes, a
    /// chunk tag is wrong, the format is not PCM, or the derived fields
    /// (byte rate, block align) are inconsistent.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(Error::InvalidInput(format!(
                "WAV stream too short: {} bytes",
                bytes.len()
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_size = read_u32(bytes, 16);
        if fmt_size != FMT_CHUNK_SIZE {
            return Err(Error::InvalidInput(format!(
                "Unexpected fmt chunk size {}",
                fmt_size
            )));
        }
        let format = read_u16(bytes, 20);
        if format != FORMAT_PCM {
            return Err(Error::InvalidInput(format!(
                "Unsupported WAV format tag {}",
                format
            )));
        }

        let header = Self {
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bits_per_sample: read_u16(bytes, 34),
            data_size: read_u32(bytes, 40),
        };

        let (byte_rate, block_align) = header.checked_rates().ok_or_else(|| {
            Error::InvalidInput(format!(
                "WAV format out of range: {} Hz, {} channels, {} bits",
                header.sample_rate, header.channels, header.bits_per_sample
            ))
        })?;
        if read_u32(bytes, 28) != byte_rate || read_u16(bytes, 32) != block_align {
            return Err(Error::InvalidInput(
                "WAV byte rate or block align inconsistent with format".to_string(),
            ));
        }
        if read_u32(bytes, 4) != header.riff_size() {
            return Err(Error::InvalidInput(
                "RIFF chunk size inconsistent with data size".to_string(),
            ));
        }

        Ok(header)
    }
}

/// Wrap raw 16-bit mono 24 kHz PCM bytes in a canonical WAV container.
///
/// The output is exactly `44 + pcm.len()` bytes; the input is copied
/// unchanged starting at offset 44. Empty input yields a valid 44-byte WAV
/// with a zero-length data chunk.
pub fn encode_wav(pcm: &[u8]) -> Vec<u8> {
    let header = WavHeader::for_pcm(pcm.len());

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(pcm);
    out
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<()> {
    if &bytes[offset..offset + 4] == tag {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Expected '{}' at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )))
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_bare_header() {
        let wav = encode_wav(&[]);
        assert_eq!(wav.len(), 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(read_u32(&wav, 4), 36);
        assert_eq!(read_u32(&wav, 40), 0);
    }

    #[test]
    fn test_header_fields_at_fixed_offsets() {
        let wav = encode_wav(&[0u8; 10]);

        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32(&wav, 16), 16);
        assert_eq!(read_u16(&wav, 20), 1);
        assert_eq!(read_u16(&wav, 22), 1);
        assert_eq!(read_u32(&wav, 24), 24_000);
        assert_eq!(read_u32(&wav, 28), 48_000);
        assert_eq!(read_u16(&wav, 32), 2);
        assert_eq!(read_u16(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32(&wav, 40), 10);
        assert_eq!(read_u32(&wav, 4), 46);
    }

    #[test]
    fn test_odd_length_payload_is_copied_verbatim() {
        let pcm = [1u8, 2, 3];
        let wav = encode_wav(&pcm);
        assert_eq!(wav.len(), 47);
        assert_eq!(&wav[44..], &pcm);
    }

    #[test]
    fn test_parse_reads_back_encoded_header() {
        let wav = encode_wav(&[0u8; 480]);
        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header, WavHeader::for_pcm(480));
        assert_eq!(header.duration_ms(), 10);
    }

    #[test]
    fn test_parse_rejects_short_and_mistagged_streams() {
        assert!(WavHeader::parse(&[0u8; 43]).is_err());

        let mut wav = encode_wav(&[0u8; 4]);
        wav[8..12].copy_from_slice(b"AVI ");
        assert!(WavHeader::parse(&wav).is_err());
    }

    #[test]
    fn test_parse_rejects_inconsistent_riff_size() {
        let mut wav = encode_wav(&[0u8; 4]);
        wav[4..8].copy_from_slice(&999u32.to_le_bytes());
        assert!(WavHeader::parse(&wav).is_err());
    }

    #[test]
    fn test_parse_rejects_overflowing_format_fields() {
        let mut wav = encode_wav(&[0u8; 4]);
        wav[22..24].copy_from_slice(&2u16.to_le_bytes());
        wav[24..28].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(WavHeader::parse(&wav), Err(Error::InvalidInput(_))));

        let mut wav = encode_wav(&[0u8; 4]);
        wav[22..24].copy_from_slice(&u16::MAX.to_le_bytes());
        assert!(matches!(WavHeader::parse(&wav), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_derived_fields_saturate_instead_of_overflowing() {
        let header = WavHeader {
            channels: 2,
            sample_rate: u32::MAX,
            ..WavHeader::for_pcm(0)
        };
        assert_eq!(header.byte_rate(), u32::MAX);
        assert_eq!(header.block_align(), 4);
    }

    #[test]
    fn test_oversized_payload_saturates_size_fields() {
        let header = WavHeader {
            data_size: u32::MAX - 10,
            ..WavHeader::for_pcm(0)
        };
        assert_eq!(header.riff_size(), u32::MAX);
    }
}
