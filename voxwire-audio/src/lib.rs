//! Capture-side audio handling for Voxwire
//!
//! Incoming audio chunks arrive in whatever PCM format the client
//! uses; everything downstream expects 16 kHz 16-bit signed
//! little-endian mono. This crate converts chunks to that target
//! format and buffers them into a per-turn WAV file, since none of
//! the supported engines decode incrementally.

pub mod convert;
pub mod error;
pub mod sink;

pub use convert::{convert_chunk, TARGET_SPEC};
pub use error::{AudioError, Result};
pub use sink::{read_wav_samples, WavSink};
