//! Async framing over any tokio byte stream

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{EventError, Result};
use crate::event::{Event, WireHeader};

/// Hard cap on a single event payload. Audio clients send chunks of
/// a few KB; anything near this limit is a broken or hostile peer.
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Hard cap on the JSON header line. Headers are a type tag plus a
/// small data object; this also bounds reads from a peer that never
/// sends a newline.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Reads framed events from a buffered byte stream
pub struct EventReader<R> {
    inner: R,
    line: String,
}

impl<R: AsyncBufRead + Unpin> EventReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
        }
    }

    /// Read the next event, or `None` on clean end of stream.
    pub async fn read_event(&mut self) -> Result<Option<Event>> {
        self.line.clear();
        let n = (&mut self.inner)
            .take(MAX_HEADER_BYTES as u64 + 1)
            .read_line(&mut self.line)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        if n > MAX_HEADER_BYTES {
            return Err(EventError::HeaderTooLarge(MAX_HEADER_BYTES));
        }

        let header: WireHeader = serde_json::from_str(self.line.trim_end())
            .map_err(|e| EventError::MalformedHeader(e.to_string()))?;

        let payload = match header.payload_length {
            Some(len) if len > MAX_PAYLOAD_BYTES => {
                return Err(EventError::PayloadTooLarge(len, MAX_PAYLOAD_BYTES));
            }
            Some(len) if len > 0 => {
                let mut buf = vec![0u8; len];
                self.inner.read_exact(&mut buf).await?;
                buf
            }
            _ => Vec::new(),
        };

        let event = Event::from_wire(header, payload)?;
        trace!("Read event: {}", event.wire_type());
        Ok(Some(event))
    }
}

/// Writes framed events to a byte stream
pub struct EventWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> EventWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Give the underlying stream back, e.g. to shut it down
    pub fn into_inner(self) -> W {
        self.inner
    }

    pub async fn write_event(&mut self, event: &Event) -> Result<()> {
        let (header, payload) = event.to_wire()?;
        let mut line = serde_json::to_string(&header)?;
        line.push('\n');

        self.inner.write_all(line.as_bytes()).await?;
        if let Some(payload) = payload {
            self.inner.write_all(payload).await?;
        }
        self.inner.flush().await?;

        trace!("Wrote event: {}", event.wire_type());
        Ok(())
    }
}
