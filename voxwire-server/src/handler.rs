//! Per-connection session dispatcher
//!
//! One handler per connection, looping Idle → Capturing → Finalizing
//! → Idle once per turn. Audio is buffered to a per-session WAV file
//! while the backend adapter resolves in the background; at audio
//! stop the (possibly blocking) transcription runs on a worker
//! thread under the adapter's exclusive inference lock.

use std::sync::Arc;

use tempfile::TempDir;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use voxwire_audio::{convert_chunk, AudioError, WavSink};
use voxwire_events::{AsrInfo, AudioSpec, Event, EventReader, EventWriter};
use voxwire_stt::SttError;

use crate::error::Result;
use crate::loader::{ModelLoader, SharedTranscriber};

/// Session state machine for one connection
pub struct DispatchHandler<R, W> {
    reader: EventReader<R>,
    writer: EventWriter<W>,
    loader: Arc<ModelLoader>,
    info_event: Event,
    /// Current turn's language override
    language: Option<String>,
    /// Scratch directory holding this session's turn WAV files
    wav_dir: TempDir,
    sink: Option<WavSink>,
    /// In-flight speculative adapter resolution
    pending: Option<JoinHandle<std::result::Result<SharedTranscriber, SttError>>>,
    turn: u64,
}

impl<R, W> DispatchHandler<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        reader: R,
        writer: W,
        loader: Arc<ModelLoader>,
        info: AsrInfo,
    ) -> std::io::Result<Self> {
        Ok(Self {
            reader: EventReader::new(reader),
            writer: EventWriter::new(writer),
            loader,
            info_event: Event::Info(info),
            language: None,
            wav_dir: tempfile::tempdir()?,
            sink: None,
            pending: None,
            turn: 0,
        })
    }

    /// Serve the connection until clean EOF or an unrecoverable error.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let event = match self.reader.read_event().await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(e) => return Err(e.into()),
            };
            self.handle_event(event).await?;
        }
        debug!("Session closed");
        Ok(())
    }

    async fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Describe => {
                self.writer.write_event(&self.info_event).await?;
                debug!("Sent info");
            }
            Event::Transcribe { language } => {
                debug!("Language set to {:?}", language);
                self.language = language;
            }
            Event::AudioStart(spec) => {
                debug!("Audio started: {:?}", spec);
            }
            Event::AudioChunk { spec, audio } => {
                self.handle_chunk(spec, &audio).await?;
            }
            Event::AudioStop => {
                self.handle_stop().await?;
            }
            other => {
                debug!("Ignoring event: {}", other.wire_type());
            }
        }
        Ok(())
    }

    /// Convert and buffer one chunk; on the first chunk of a turn,
    /// open the sink and kick off adapter resolution so loading
    /// overlaps with the rest of the capture.
    async fn handle_chunk(&mut self, spec: AudioSpec, audio: &[u8]) -> Result<()> {
        let converted = convert_chunk(spec, audio)?;

        if self.sink.is_none() {
            let path = self.wav_dir.path().join(format!("turn-{}.wav", self.turn));
            self.sink = Some(WavSink::create(&path)?);
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.write_pcm(&converted)?;
        }

        if self.pending.is_none() {
            let loader = Arc::clone(&self.loader);
            let language = self.language.clone();
            self.pending =
                Some(tokio::spawn(
                    async move { loader.load(language.as_deref()).await },
                ));
        }

        Ok(())
    }

    async fn handle_stop(&mut self) -> Result<()> {
        let Some(sink) = self.sink.take() else {
            // AudioStop with no prior audio; nothing to transcribe
            warn!("Audio stopped without any buffered audio; ignoring");
            return Ok(());
        };

        let buffered_secs = sink.duration_secs();
        let wav_path = sink.finish()?;
        debug!("Audio stopped ({buffered_secs:.1}s buffered)");

        let Some(pending) = self.pending.take() else {
            warn!("Audio stopped with no adapter resolution in flight; ignoring");
            self.reset_turn();
            return Ok(());
        };

        // The one suspension point that can add latency: resolution
        // outlasting capture.
        let adapter = match pending.await {
            Ok(Ok(adapter)) => adapter,
            Ok(Err(e)) => {
                error!("Failed to load transcriber: {e}");
                self.reset_turn();
                return Ok(());
            }
            Err(e) => {
                error!("Adapter resolution task failed: {e}");
                self.reset_turn();
                return Ok(());
            }
        };

        let language = self.loader.effective_language(self.language.as_deref());
        let opts = self.loader.settings().decode.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut transcriber = adapter.lock();
            transcriber.transcribe(&wav_path, language.as_deref(), &opts)
        })
        .await;

        match result {
            Ok(Ok(text)) => {
                info!("{}", text);
                self.writer.write_event(&Event::Transcript { text }).await?;
                debug!("Completed request");
            }
            Ok(Err(e)) => {
                // Temp-file I/O failures are unrecoverable for this
                // session; everything else just fails the turn. The
                // adapter reads the buffered WAV back, so its I/O
                // errors arrive wrapped in the audio variant.
                if matches!(
                    e,
                    SttError::Io(_) | SttError::Audio(AudioError::Io(_) | AudioError::Wav(_))
                ) {
                    self.reset_turn();
                    return Err(e.into());
                }
                error!("Transcription failed: {e}");
            }
            Err(e) => {
                error!("Transcription task failed: {e}");
            }
        }

        self.reset_turn();
        Ok(())
    }

    fn reset_turn(&mut self) {
        self.language = None;
        self.sink = None;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.turn += 1;
    }
}

impl<R, W> Drop for DispatchHandler<R, W> {
    fn drop(&mut self) {
        // A connection closing mid-capture must not leak its
        // speculative resolution task.
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
