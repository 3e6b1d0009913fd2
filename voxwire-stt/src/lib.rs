//! Speech-to-text backends for Voxwire
//!
//! One `Transcriber` contract, several engines behind it:
//!
//! - whisper.cpp via whisper-rs (baseline, always compiled)
//! - Parakeet-TDT transducers via sherpa-onnx (`parakeet` feature)
//! - GigaAM v2 Russian transducer via sherpa-onnx (`gigaam` feature)
//!
//! Which engines exist is decided at compile time; [`Capabilities`]
//! exposes that as plain data so the selection policy upstream stays
//! a pure function.

pub mod error;
pub mod fetch;
pub mod library;
pub mod transcriber;
pub mod whisper;

#[cfg(feature = "gigaam")]
pub mod gigaam;
#[cfg(feature = "parakeet")]
pub mod parakeet;

pub use error::{Result, SttError};
pub use library::{
    guess_model, is_constrained_platform, select_library, Capabilities, SttLibrary,
    PARAKEET_LANGUAGES,
};
pub use transcriber::{DecodeOptions, EngineHints, Transcriber, VadOptions};
pub use whisper::WhisperTranscriber;

#[cfg(feature = "gigaam")]
pub use gigaam::GigaAmTranscriber;
#[cfg(feature = "parakeet")]
pub use parakeet::ParakeetTranscriber;
