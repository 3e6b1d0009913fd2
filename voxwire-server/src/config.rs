//! Command-line configuration

use std::path::PathBuf;

use clap::Parser;

use voxwire_stt::{is_constrained_platform, DecodeOptions, EngineHints, SttLibrary, VadOptions};

use crate::error::{Result, ServerError};
use crate::loader::LoaderSettings;

/// Voxwire speech-to-text server
#[derive(Parser, Debug, Clone)]
#[command(name = "voxwire-server", version, about)]
pub struct ServerConfig {
    /// unix://PATH, tcp://HOST:PORT, or stdio://
    #[arg(long, default_value = "tcp://127.0.0.1:10300")]
    pub uri: String,

    /// Speech-to-text library: auto, whisper, parakeet, or gigaam
    #[arg(long, default_value = "auto")]
    pub stt_library: String,

    /// Model id, or "auto" to guess from library and language
    #[arg(long, default_value = "auto")]
    pub model: String,

    /// Default transcription language, or "auto"
    #[arg(long, default_value = "auto")]
    pub language: String,

    /// Beam width during decoding (0 selects automatically)
    #[arg(long, default_value_t = 0)]
    pub beam_size: u32,

    /// Optional text to prompt the first decoding window
    #[arg(long)]
    pub initial_prompt: Option<String>,

    /// Filter out non-speech audio before decoding
    #[arg(long)]
    pub vad_filter: bool,

    /// No-speech probability threshold for --vad-filter
    #[arg(long, default_value_t = 0.6)]
    pub vad_threshold: f32,

    /// Minimum speech duration in ms for --vad-filter
    #[arg(long, default_value_t = 250)]
    pub vad_min_speech_ms: u32,

    /// Minimum silence duration in ms for --vad-filter
    #[arg(long, default_value_t = 500)]
    pub vad_min_silence_ms: u32,

    /// Inference device hint passed through to the engine
    #[arg(long, default_value = "cpu")]
    pub device: String,

    /// Numeric precision hint passed through to the engine
    #[arg(long, default_value = "default")]
    pub compute_type: String,

    /// Worker threads for CPU inference
    #[arg(long, default_value_t = 4)]
    pub cpu_threads: i32,

    /// Directory for downloaded models (default: the user cache dir)
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Never hit the network; fail if a model is not cached
    #[arg(long)]
    pub local_files_only: bool,

    /// Log DEBUG messages
    #[arg(long)]
    pub debug: bool,
}

impl ServerConfig {
    /// Validate and turn flags into loader settings.
    ///
    /// Invalid combinations are fatal here, before the server starts
    /// accepting connections.
    pub fn loader_settings(&self) -> Result<LoaderSettings> {
        let library: SttLibrary = self
            .stt_library
            .parse()
            .map_err(|e| ServerError::config(format!("{e}")))?;

        let model = match self.model.as_str() {
            "auto" => None,
            explicit => Some(explicit.to_string()),
        };

        let language = match self.language.as_str() {
            "auto" => None,
            code => Some(code.to_string()),
        };

        let beam_size = if self.beam_size == 0 {
            if is_constrained_platform() {
                1
            } else {
                5
            }
        } else {
            self.beam_size
        };

        let vad = self.vad_filter.then(|| VadOptions {
            threshold: self.vad_threshold,
            min_speech_ms: self.vad_min_speech_ms,
            min_silence_ms: self.vad_min_silence_ms,
        });

        let download_dir = match &self.download_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .ok_or_else(|| ServerError::config("no cache directory; pass --download-dir"))?
                .join("voxwire"),
        };

        Ok(LoaderSettings {
            library,
            model,
            language,
            decode: DecodeOptions {
                beam_size,
                initial_prompt: self.initial_prompt.clone(),
                vad,
            },
            hints: EngineHints {
                device: self.device.clone(),
                compute_type: self.compute_type.clone(),
                cpu_threads: self.cpu_threads,
            },
            download_dir,
            local_files_only: self.local_files_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["voxwire-server"];
        argv.extend_from_slice(args);
        ServerConfig::parse_from(argv)
    }

    #[test]
    fn test_auto_values_normalize_to_none() {
        let settings = config(&["--download-dir", "/tmp/models"])
            .loader_settings()
            .unwrap();
        assert_eq!(settings.library, SttLibrary::Auto);
        assert_eq!(settings.model, None);
        assert_eq!(settings.language, None);
    }

    #[test]
    fn test_beam_size_zero_is_resolved() {
        let settings = config(&["--download-dir", "/tmp/models"])
            .loader_settings()
            .unwrap();
        assert!(settings.decode.beam_size >= 1);

        let settings = config(&["--download-dir", "/tmp/models", "--beam-size", "3"])
            .loader_settings()
            .unwrap();
        assert_eq!(settings.decode.beam_size, 3);
    }

    #[test]
    fn test_unknown_library_is_a_config_error() {
        let err = config(&["--download-dir", "/tmp/models", "--stt-library", "vosk"])
            .loader_settings()
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_vad_options_follow_the_flag() {
        let settings = config(&["--download-dir", "/tmp/models"])
            .loader_settings()
            .unwrap();
        assert!(settings.decode.vad.is_none());

        let settings = config(&[
            "--download-dir",
            "/tmp/models",
            "--vad-filter",
            "--vad-threshold",
            "0.4",
        ])
        .loader_settings()
        .unwrap();
        let vad = settings.decode.vad.unwrap();
        assert!((vad.threshold - 0.4).abs() < 1e-6);
    }
}
