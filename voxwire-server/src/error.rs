//! Server error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URI '{0}': expected unix://PATH, tcp://HOST:PORT, or stdio://")]
    InvalidUri(String),

    #[error("Protocol error: {0}")]
    Event(#[from] voxwire_events::EventError),

    #[error("Audio error: {0}")]
    Audio(#[from] voxwire_audio::AudioError),

    #[error("Speech-to-text error: {0}")]
    Stt(#[from] voxwire_stt::SttError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
