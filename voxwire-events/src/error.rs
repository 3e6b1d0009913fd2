//! Error types for the event protocol

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EventError>;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed event header: {0}")]
    MalformedHeader(String),

    #[error("Event '{0}' is missing required data")]
    MissingData(String),

    #[error("Payload of {0} bytes exceeds the {1} byte limit")]
    PayloadTooLarge(usize, usize),

    #[error("Header line exceeds the {0} byte limit")]
    HeaderTooLarge(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
