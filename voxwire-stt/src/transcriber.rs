//! The capability every backend implements

use std::path::Path;

use crate::error::Result;

/// Voice-activity filtering parameters, consumed only by engines
/// that support a no-speech filter (currently the baseline whisper
/// engine).
#[derive(Debug, Clone, PartialEq)]
pub struct VadOptions {
    /// No-speech probability threshold
    pub threshold: f32,
    /// Minimum speech duration in milliseconds
    pub min_speech_ms: u32,
    /// Minimum silence duration in milliseconds
    pub min_silence_ms: u32,
}

impl Default for VadOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            min_speech_ms: 250,
            min_silence_ms: 500,
        }
    }
}

/// Decoding parameters shared across a server's turns
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Beam width for beam-search engines; 1 means greedy
    pub beam_size: u32,
    /// Optional prompt for the first decoding window
    pub initial_prompt: Option<String>,
    /// Optional voice-activity filter
    pub vad: Option<VadOptions>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            beam_size: 5,
            initial_prompt: None,
            vad: None,
        }
    }
}

/// Opaque engine construction hints passed through from configuration
#[derive(Debug, Clone)]
pub struct EngineHints {
    /// Inference device ("cpu", "cuda", ...)
    pub device: String,
    /// Numeric precision hint ("default", "int8", "float16", ...)
    pub compute_type: String,
    /// Worker threads for CPU inference
    pub cpu_threads: i32,
}

impl Default for EngineHints {
    fn default() -> Self {
        Self {
            device: "cpu".to_string(),
            compute_type: "default".to_string(),
            cpu_threads: 4,
        }
    }
}

/// Contract every backend adapter implements.
///
/// `wav_path` must point at prepared 16 kHz 16-bit mono PCM; the
/// adapter validates this eagerly and fails rather than guessing.
/// `language` of `None` means auto-detect where the engine supports
/// it, otherwise the engine's default. Segmented engine output is
/// flattened with single-space separators.
///
/// Engines are not assumed safe for concurrent inference, hence
/// `&mut self`; the loader serializes calls per adapter instance.
pub trait Transcriber: Send {
    fn transcribe(
        &mut self,
        wav_path: &Path,
        language: Option<&str>,
        opts: &DecodeOptions,
    ) -> Result<String>;
}
