//! Typed events and their wire representation

use serde::{Deserialize, Serialize};

use crate::error::{EventError, Result};
use crate::info::AsrInfo;

/// PCM format carried by audio events
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    /// Sample rate in Hz
    pub rate: u32,
    /// Bytes per sample
    pub width: u16,
    /// Channel count
    pub channels: u16,
}

/// One protocol event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Client asks for a service description
    Describe,
    /// Server response to `Describe`
    Info(AsrInfo),
    /// Declares the language for the upcoming turn
    Transcribe { language: Option<String> },
    /// Start of an audio turn
    AudioStart(AudioSpec),
    /// One chunk of PCM audio (bytes ride in the payload)
    AudioChunk { spec: AudioSpec, audio: Vec<u8> },
    /// End of an audio turn
    AudioStop,
    /// Final transcription result for a turn
    Transcript { text: String },
    /// Event type this server does not handle; ignored by dispatch
    Other { event_type: String },
}

/// JSON header line preceding an optional payload
#[derive(Serialize, Deserialize, Debug)]
pub(crate) struct WireHeader {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_length: Option<usize>,
}

#[derive(Serialize, Deserialize, Default)]
struct TranscribeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct TranscriptData {
    text: String,
}

impl Event {
    /// Wire type string for this event
    pub fn wire_type(&self) -> &str {
        match self {
            Event::Describe => "describe",
            Event::Info(_) => "info",
            Event::Transcribe { .. } => "transcribe",
            Event::AudioStart(_) => "audio-start",
            Event::AudioChunk { .. } => "audio-chunk",
            Event::AudioStop => "audio-stop",
            Event::Transcript { .. } => "transcript",
            Event::Other { event_type } => event_type,
        }
    }

    /// Split into a header and the payload bytes to send after it
    pub(crate) fn to_wire(&self) -> Result<(WireHeader, Option<&[u8]>)> {
        let (data, payload): (Option<serde_json::Value>, Option<&[u8]>) = match self {
            Event::Describe | Event::AudioStop | Event::Other { .. } => (None, None),
            Event::Info(info) => (Some(serde_json::to_value(info)?), None),
            Event::Transcribe { language } => (
                Some(serde_json::to_value(TranscribeData {
                    language: language.clone(),
                })?),
                None,
            ),
            Event::AudioStart(spec) => (Some(serde_json::to_value(spec)?), None),
            Event::AudioChunk { spec, audio } => {
                (Some(serde_json::to_value(spec)?), Some(audio.as_slice()))
            }
            Event::Transcript { text } => (
                Some(serde_json::to_value(TranscriptData { text: text.clone() })?),
                None,
            ),
        };

        Ok((
            WireHeader {
                event_type: self.wire_type().to_string(),
                data,
                payload_length: payload.map(|p| p.len()),
            },
            payload,
        ))
    }

    /// Rebuild an event from a decoded header and its payload bytes
    pub(crate) fn from_wire(header: WireHeader, payload: Vec<u8>) -> Result<Self> {
        let WireHeader {
            event_type, data, ..
        } = header;

        let require_data = |data: Option<serde_json::Value>| {
            data.ok_or_else(|| EventError::MissingData(event_type.clone()))
        };

        Ok(match event_type.as_str() {
            "describe" => Event::Describe,
            "info" => Event::Info(serde_json::from_value(require_data(data)?)?),
            "transcribe" => {
                let data: TranscribeData = match data {
                    Some(value) => serde_json::from_value(value)?,
                    None => TranscribeData::default(),
                };
                Event::Transcribe {
                    language: data.language,
                }
            }
            "audio-start" => Event::AudioStart(serde_json::from_value(require_data(data)?)?),
            "audio-chunk" => Event::AudioChunk {
                spec: serde_json::from_value(require_data(data)?)?,
                audio: payload,
            },
            "audio-stop" => Event::AudioStop,
            "transcript" => {
                let data: TranscriptData = serde_json::from_value(require_data(data)?)?;
                Event::Transcript { text: data.text }
            }
            _ => Event::Other { event_type },
        })
    }
}
