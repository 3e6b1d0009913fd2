//! Event protocol for the Voxwire speech-to-text server
//!
//! Every event is one JSON header line followed by an optional raw
//! payload:
//!
//! ```text
//! {"type": "audio-chunk", "data": {"rate": 16000, "width": 2, "channels": 1}, "payload_length": 2048}\n
//! <2048 payload bytes>
//! ```
//!
//! Audio bytes ride in the payload; everything else is JSON. The
//! codec works over any tokio `AsyncBufRead`/`AsyncWrite` pair, so
//! the same code serves unix sockets, TCP, and stdio.

pub mod codec;
pub mod error;
pub mod event;
pub mod info;

pub use codec::{EventReader, EventWriter};
pub use error::{EventError, Result};
pub use event::{AudioSpec, Event};
pub use info::{AsrInfo, AsrModel, AsrProgram, Attribution};
