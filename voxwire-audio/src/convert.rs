//! PCM chunk conversion to the fixed target format

use voxwire_events::AudioSpec;

use crate::error::{AudioError, Result};

/// Format every engine consumes: 16 kHz, s16le, mono
pub const TARGET_SPEC: AudioSpec = AudioSpec {
    rate: 16000,
    width: 2,
    channels: 1,
};

/// Convert one PCM chunk to [`TARGET_SPEC`].
///
/// Pure function: width conversion (8/16/32-bit), channel mixdown by
/// averaging, then nearest-sample rate conversion. Chunks that are
/// not a whole number of frames are rejected eagerly.
pub fn convert_chunk(spec: AudioSpec, bytes: &[u8]) -> Result<Vec<u8>> {
    if spec.channels == 0 || spec.rate == 0 {
        return Err(AudioError::InvalidFormat(format!(
            "{} channels at {} Hz",
            spec.channels, spec.rate
        )));
    }

    let frame = spec.width as usize * spec.channels as usize;
    if frame == 0 || bytes.len() % frame != 0 {
        return Err(AudioError::TruncatedChunk {
            len: bytes.len(),
            frame,
        });
    }

    let samples = decode_samples(spec.width, bytes)?;
    let mono = mixdown(&samples, spec.channels as usize);
    let resampled = resample(&mono, spec.rate, TARGET_SPEC.rate);

    let mut out = Vec::with_capacity(resampled.len() * 2);
    for sample in resampled {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    Ok(out)
}

/// Decode interleaved PCM bytes into i16 samples
fn decode_samples(width: u16, bytes: &[u8]) -> Result<Vec<i16>> {
    match width {
        // Unsigned 8-bit, per WAV convention
        1 => Ok(bytes
            .iter()
            .map(|&b| ((b as i16) - 128) << 8)
            .collect()),
        2 => Ok(bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()),
        4 => Ok(bytes
            .chunks_exact(4)
            .map(|c| (i32::from_le_bytes([c[0], c[1], c[2], c[3]]) >> 16) as i16)
            .collect()),
        other => Err(AudioError::UnsupportedWidth(other)),
    }
}

/// Average interleaved channels down to mono
fn mixdown(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Nearest-sample rate conversion
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = (samples.len() as f64 / ratio).ceil() as usize;
    let mut resampled = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_idx = (i as f64 * ratio) as usize;
        if src_idx < samples.len() {
            resampled.push(samples[src_idx]);
        }
    }

    resampled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(rate: u32, width: u16, channels: u16) -> AudioSpec {
        AudioSpec {
            rate,
            width,
            channels,
        }
    }

    #[test]
    fn test_target_format_passes_through() {
        let bytes: Vec<u8> = (0i16..160).flat_map(|s| s.to_le_bytes()).collect();
        let out = convert_chunk(spec(16000, 2, 1), &bytes).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_stereo_mixdown_averages() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100i16.to_le_bytes());
        bytes.extend_from_slice(&200i16.to_le_bytes());
        let out = convert_chunk(spec(16000, 2, 2), &bytes).unwrap();
        assert_eq!(out, 150i16.to_le_bytes().to_vec());
    }

    #[test]
    fn test_downsample_halves_length() {
        let bytes: Vec<u8> = (0i16..320).flat_map(|s| s.to_le_bytes()).collect();
        let out = convert_chunk(spec(32000, 2, 1), &bytes).unwrap();
        assert_eq!(out.len(), bytes.len() / 2);
    }

    #[test]
    fn test_upsample_doubles_length() {
        let bytes: Vec<u8> = (0i16..160).flat_map(|s| s.to_le_bytes()).collect();
        let out = convert_chunk(spec(8000, 2, 1), &bytes).unwrap();
        assert_eq!(out.len(), bytes.len() * 2);
    }

    #[test]
    fn test_eight_bit_is_rescaled() {
        // 128 is silence in unsigned 8-bit
        let out = convert_chunk(spec(16000, 1, 1), &[128]).unwrap();
        assert_eq!(out, 0i16.to_le_bytes().to_vec());
    }

    #[test]
    fn test_truncated_chunk_rejected() {
        let err = convert_chunk(spec(16000, 2, 2), &[0, 1, 2]).unwrap_err();
        assert!(matches!(err, AudioError::TruncatedChunk { .. }));
    }

    #[test]
    fn test_unsupported_width_rejected() {
        let err = convert_chunk(spec(16000, 3, 1), &[0, 1, 2]).unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedWidth(3)));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let bytes: Vec<u8> = (0i16..441).flat_map(|s| s.to_le_bytes()).collect();
        let a = convert_chunk(spec(44100, 2, 1), &bytes).unwrap();
        let b = convert_chunk(spec(44100, 2, 1), &bytes).unwrap();
        assert_eq!(a, b);
    }
}
