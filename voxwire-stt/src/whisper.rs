//! Baseline engine: whisper.cpp via whisper-rs

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::error::{Result, SttError};
use crate::fetch;
use crate::transcriber::{DecodeOptions, EngineHints, Transcriber};

const MODEL_URL_FORMAT: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-{model_id}.bin";

/// whisper.cpp adapter owning one loaded GGML model
pub struct WhisperTranscriber {
    context: WhisperContext,
    cpu_threads: i32,
}

impl WhisperTranscriber {
    /// Load (downloading first if needed) the GGML model `model_id`.
    ///
    /// `model_id` is either a whisper.cpp model name ("base-q8_0",
    /// "tiny.en", ...) resolved against the cache directory, or a
    /// path to an existing .bin file.
    pub fn new(
        model_id: &str,
        cache_dir: &Path,
        local_files_only: bool,
        hints: &EngineHints,
    ) -> Result<Self> {
        let model_path = ensure_model(model_id, cache_dir, local_files_only)?;
        info!("Loading whisper model from {}", model_path.display());

        let path_str = model_path
            .to_str()
            .ok_or_else(|| SttError::model_load("model path is not valid UTF-8"))?;
        let context =
            WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
                .map_err(|e| SttError::model_load(e.to_string()))?;

        Ok(Self {
            context,
            cpu_threads: hints.cpu_threads,
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(
        &mut self,
        wav_path: &Path,
        language: Option<&str>,
        opts: &DecodeOptions,
    ) -> Result<String> {
        let samples = voxwire_audio::read_wav_samples(wav_path)?;
        debug!(
            "Transcribing {} samples with language={:?}",
            samples.len(),
            language
        );

        let strategy = if opts.beam_size <= 1 {
            SamplingStrategy::Greedy { best_of: 1 }
        } else {
            SamplingStrategy::BeamSearch {
                beam_size: opts.beam_size as i32,
                patience: -1.0,
            }
        };

        let mut params = FullParams::new(strategy);
        params.set_n_threads(self.cpu_threads);
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_language(language);
        if let Some(prompt) = opts.initial_prompt.as_deref() {
            params.set_initial_prompt(prompt);
        }
        if let Some(vad) = &opts.vad {
            params.set_suppress_blank(true);
            params.set_no_speech_thold(vad.threshold);
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| SttError::inference(e.to_string()))?;
        state
            .full(params, &samples)
            .map_err(|e| SttError::inference(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::inference(e.to_string()))?;
        let mut pieces = Vec::with_capacity(n_segments as usize);
        for i in 0..n_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::inference(e.to_string()))?;
            let segment = segment.trim();
            if !segment.is_empty() {
                pieces.push(segment.to_string());
            }
        }

        Ok(pieces.join(" "))
    }
}

/// Resolve a model id to a local GGML file, downloading if allowed
fn ensure_model(model_id: &str, cache_dir: &Path, local_files_only: bool) -> Result<PathBuf> {
    let as_path = Path::new(model_id);
    if as_path.is_file() {
        return Ok(as_path.to_path_buf());
    }

    let model_path = cache_dir.join(format!("ggml-{model_id}.bin"));
    if model_path.is_file() {
        debug!("Using cached model {}", model_path.display());
        return Ok(model_path);
    }

    if local_files_only {
        return Err(SttError::download(format!(
            "model '{model_id}' not found in {} and downloads are disabled",
            cache_dir.display()
        )));
    }

    let url = MODEL_URL_FORMAT.replace("{model_id}", model_id);
    fetch::fetch_file(&url, &model_path)?;
    Ok(model_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_offline_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_model("base-q8_0", dir.path(), true).unwrap_err();
        assert!(matches!(err, SttError::Download(_)));
    }

    #[test]
    fn test_existing_file_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.bin");
        std::fs::write(&path, b"stub").unwrap();

        let resolved = ensure_model(path.to_str().unwrap(), dir.path(), true).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_cached_model_found() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("ggml-base-q8_0.bin");
        std::fs::write(&cached, b"stub").unwrap();

        let resolved = ensure_model("base-q8_0", dir.path(), true).unwrap();
        assert_eq!(resolved, cached);
    }
}
