//! Error types for STT operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Model loading error: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Model download error: {0}")]
    Download(String),

    #[error("Unknown speech-to-text library: {0}")]
    UnknownLibrary(String),

    #[error("Audio error: {0}")]
    Audio(#[from] voxwire_audio::AudioError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SttError {
    pub fn model_load<S: Into<String>>(msg: S) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    pub fn download<S: Into<String>>(msg: S) -> Self {
        Self::Download(msg.into())
    }
}
