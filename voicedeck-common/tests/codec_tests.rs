//! Codec property tests
//!
//! Covers the base64 round trip, WAV header layout, PCM normalization and
//! truncation, and the end-to-end path from a base64 payload to a WAV clip.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;
use voicedeck_common::codec::{
    decode_base64, decode_pcm16, encode_base64, encode_wav, WavHeader, WAV_HEADER_LEN,
};

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn test_base64_round_trip_for_every_length_up_to_10000() {
    let source = random_bytes(10_000, 0x5eed);

    for len in 0..=source.len() {
        let original = &source[..len];
        let decoded = decode_base64(&encode_base64(original)).unwrap();
        assert_eq!(decoded, original, "round trip failed at length {}", len);
    }
}

#[test]
fn test_wav_header_correct_for_varied_lengths() {
    for (i, len) in [0usize, 1, 2, 3, 44, 255, 4096, 9999].into_iter().enumerate() {
        let pcm = random_bytes(len, i as u64);
        let wav = encode_wav(&pcm);

        assert_eq!(wav.len(), WAV_HEADER_LEN + len);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + len as u32);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32_at(&wav, 28), 48_000, "byte rate");
        assert_eq!(u16_at(&wav, 32), 2, "block align");
        assert_eq!(u16_at(&wav, 34), 16, "bits per sample");
        assert_eq!(u32_at(&wav, 40), len as u32);
        assert_eq!(&wav[44..], &pcm[..]);
    }
}

#[test]
fn test_empty_pcm_gives_44_byte_wav() {
    let wav = encode_wav(&[]);
    assert_eq!(wav.len(), 44);
    assert_eq!(u32_at(&wav, 40), 0, "data size");
    assert_eq!(u32_at(&wav, 4), 36, "RIFF size");
    assert_eq!(WavHeader::parse(&wav).unwrap().data_size, 0);
}

#[test]
fn test_sample_normalization_extremes() {
    let low = decode_pcm16(&[0x00, 0x80], 24_000, 1);
    assert_eq!(low.channel(0).unwrap()[0], -1.0);

    let high = decode_pcm16(&[0xFF, 0x7F], 24_000, 1);
    let sample = high.channel(0).unwrap()[0];
    assert!((sample - 0.999_969).abs() < 1e-6);
    assert_eq!(sample, 32767.0 / 32768.0);
}

#[test]
fn test_truncation_policy() {
    assert_eq!(decode_pcm16(&[0u8; 5], 24_000, 1).frame_count(), 2);
    assert_eq!(decode_pcm16(&[0u8; 3], 24_000, 2).frame_count(), 0);
}

#[test]
fn test_four_sample_clip_end_to_end() {
    let samples = [1000i16, -1000, 32767, -32768];
    let expected = pcm_bytes(&samples);
    let payload = encode_base64(&expected);
    assert_eq!(payload, "6AMY/P9/AIA=");

    let pcm = decode_base64(&payload).unwrap();
    assert_eq!(pcm, expected);
    assert_eq!(pcm.len(), 8);

    let wav = encode_wav(&pcm);
    assert_eq!(wav.len(), 52);
    assert_eq!(&wav[44..], &expected[..]);

    let buffer = decode_pcm16(&pcm, 24_000, 1);
    let normalized: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    assert_eq!(buffer.channel(0).unwrap(), &normalized[..]);
}

#[test]
fn test_encoded_wav_is_readable_by_hound() {
    let samples: Vec<i16> = (0..2400).map(|i| ((i * 37) % 65536 - 32768) as i16).collect();
    let wav = encode_wav(&pcm_bytes(&samples));

    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let format = reader.spec();
    assert_eq!(format.channels, 1);
    assert_eq!(format.sample_rate, 24_000);
    assert_eq!(format.bits_per_sample, 16);
    assert_eq!(format.sample_format, hound::SampleFormat::Int);

    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(decoded, samples);
}

#[test]
fn test_decoding_is_independent_across_threads() {
    let handles: Vec<_> = (0..8u64)
        .map(|seed| {
            std::thread::spawn(move || {
                let pcm = random_bytes(4800, seed);
                let wav = encode_wav(&pcm);
                let buffer = decode_pcm16(&pcm, 24_000, 1);
                (pcm, wav, buffer.frame_count())
            })
        })
        .collect();

    for handle in handles {
        let (pcm, wav, frames) = handle.join().unwrap();
        assert_eq!(&wav[44..], &pcm[..]);
        assert_eq!(frames, 2400);
    }
}
