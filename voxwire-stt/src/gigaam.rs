//! GigaAM v2 Russian transducer engine via sherpa-onnx

use std::path::Path;

use sherpa_rs::transducer::{TransducerConfig, TransducerRecognizer};
use tracing::{debug, info};

use crate::error::{Result, SttError};
use crate::fetch;
use crate::transcriber::{DecodeOptions, EngineHints, Transcriber};

/// Mel filterbank dimension for GigaAM models
const FEATURE_DIM: i32 = 64;

/// sherpa-onnx adapter owning one loaded GigaAM transducer
pub struct GigaAmTranscriber {
    recognizer: TransducerRecognizer,
}

impl GigaAmTranscriber {
    pub fn new(
        model_id: &str,
        cache_dir: &Path,
        local_files_only: bool,
        hints: &EngineHints,
    ) -> Result<Self> {
        let model_dir = fetch::ensure_sherpa_model(model_id, cache_dir, local_files_only)?;
        info!("Loading gigaam model from {}", model_dir.display());

        let config = TransducerConfig {
            encoder: model_dir.join("encoder.int8.onnx").display().to_string(),
            decoder: model_dir.join("decoder.int8.onnx").display().to_string(),
            joiner: model_dir.join("joiner.int8.onnx").display().to_string(),
            tokens: model_dir.join("tokens.txt").display().to_string(),
            num_threads: hints.cpu_threads,
            sample_rate: 16000,
            feature_dim: FEATURE_DIM,
            model_type: "nemo_transducer".to_string(),
            decoding_method: "greedy_search".to_string(),
            hotwords_file: String::new(),
            hotwords_score: 1.5,
            modeling_unit: String::new(),
            bpe_vocab: String::new(),
            blank_penalty: 0.0,
            debug: false,
            provider: Some(hints.device.clone()),
        };

        let mut recognizer = TransducerRecognizer::new(config)
            .map_err(|e| SttError::model_load(e.to_string()))?;

        // Prime so the first real transcription is fast
        let _ = recognizer.transcribe(16000, &vec![0.0f32; 128]);

        Ok(Self { recognizer })
    }
}

impl Transcriber for GigaAmTranscriber {
    fn transcribe(
        &mut self,
        wav_path: &Path,
        language: Option<&str>,
        _opts: &DecodeOptions,
    ) -> Result<String> {
        // Russian-only model; the language hint is advisory here.
        let samples = voxwire_audio::read_wav_samples(wav_path)?;
        debug!(
            "Transcribing {} samples with language={:?}",
            samples.len(),
            language
        );

        let text = self.recognizer.transcribe(16000, &samples);
        Ok(text.trim().to_string())
    }
}
