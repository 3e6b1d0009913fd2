//! Per-turn WAV buffering

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::convert::TARGET_SPEC;
use crate::error::{AudioError, Result};

/// Append-only WAV file holding one turn of converted audio.
///
/// Created lazily on the first chunk of a turn; `finish` finalizes
/// the header and hands the path to the transcriber.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    samples_written: u64,
}

impl WavSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let spec = WavSpec {
            channels: TARGET_SPEC.channels,
            sample_rate: TARGET_SPEC.rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&path, spec)?;
        debug!("Opened audio sink at {}", path.display());

        Ok(Self {
            writer,
            path,
            samples_written: 0,
        })
    }

    /// Append converted s16le bytes
    pub fn write_pcm(&mut self, bytes: &[u8]) -> Result<()> {
        for sample in bytes.chunks_exact(2) {
            self.writer
                .write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
        }
        self.samples_written += (bytes.len() / 2) as u64;
        Ok(())
    }

    /// Seconds of audio buffered so far
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / TARGET_SPEC.rate as f64
    }

    /// Finalize the WAV header and return the file path
    pub fn finish(self) -> Result<PathBuf> {
        self.writer.finalize()?;
        debug!("Finalized audio sink at {}", self.path.display());
        Ok(self.path)
    }
}

/// Read a buffered turn back as f32 samples in [-1, 1].
///
/// The file must be 16 kHz 16-bit mono; anything else means a
/// conversion bug upstream and is rejected before decoding.
pub fn read_wav_samples(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    if spec.sample_rate != TARGET_SPEC.rate {
        return Err(AudioError::InvalidFormat(format!(
            "sample rate must be {} Hz, got {}",
            TARGET_SPEC.rate, spec.sample_rate
        )));
    }
    if spec.bits_per_sample != 16 {
        return Err(AudioError::InvalidFormat(format!(
            "width must be 16-bit, got {}",
            spec.bits_per_sample
        )));
    }
    if spec.channels != 1 {
        return Err(AudioError::InvalidFormat(format!(
            "audio must be mono, got {} channels",
            spec.channels
        )));
    }

    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|sample| sample as f32 / 32767.0))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");

        let mut sink = WavSink::create(&path).unwrap();
        let bytes: Vec<u8> = (0i16..16000).flat_map(|s| s.to_le_bytes()).collect();
        sink.write_pcm(&bytes).unwrap();
        assert!((sink.duration_secs() - 1.0).abs() < 1e-9);

        let path = sink.finish().unwrap();
        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples.len(), 16000);
        assert_eq!(samples[0], 0.0);
        assert!(samples[1] > 0.0);
    }

    #[test]
    fn test_reader_rejects_wrong_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        let err = read_wav_samples(&path).unwrap_err();
        assert!(matches!(err, AudioError::InvalidFormat(_)));
    }
}
