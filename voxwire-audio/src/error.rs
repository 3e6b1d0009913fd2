//! Error types for audio conversion and buffering

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AudioError>;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Unsupported sample width: {0} bytes")]
    UnsupportedWidth(u16),

    #[error("Chunk of {len} bytes is not a whole number of {frame}-byte frames")]
    TruncatedChunk { len: usize, frame: usize },

    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
