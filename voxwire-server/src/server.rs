//! Listener setup and the accept loop

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{TcpListener, UnixListener};
use tracing::{debug, error, info};

use voxwire_events::AsrInfo;
use voxwire_stt::Capabilities;

use crate::error::{Result, ServerError};
use crate::handler::DispatchHandler;
use crate::info::describe_info;
use crate::loader::{LoaderSettings, ModelLoader};

/// Where the server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAddress {
    Tcp(String),
    Unix(PathBuf),
    Stdio,
}

impl BindAddress {
    pub fn parse(uri: &str) -> Result<Self> {
        if let Some(addr) = uri.strip_prefix("tcp://") {
            if addr.is_empty() {
                return Err(ServerError::InvalidUri(uri.to_string()));
            }
            return Ok(BindAddress::Tcp(addr.to_string()));
        }
        if let Some(path) = uri.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(ServerError::InvalidUri(uri.to_string()));
            }
            return Ok(BindAddress::Unix(PathBuf::from(path)));
        }
        if uri == "stdio://" {
            return Ok(BindAddress::Stdio);
        }
        Err(ServerError::InvalidUri(uri.to_string()))
    }
}

/// Accepts connections and hands each one its own session
pub struct Server {
    loader: Arc<ModelLoader>,
    info: AsrInfo,
}

impl Server {
    pub fn new(settings: LoaderSettings) -> Self {
        let capabilities = Capabilities::detect();
        let info = describe_info(&settings, capabilities);
        Self {
            loader: Arc::new(ModelLoader::new(settings, capabilities)),
            info,
        }
    }

    pub async fn run(&self, uri: &str) -> Result<()> {
        match BindAddress::parse(uri)? {
            BindAddress::Tcp(addr) => self.run_tcp(&addr).await,
            BindAddress::Unix(path) => self.run_unix(&path).await,
            BindAddress::Stdio => self.run_stdio().await,
        }
    }

    async fn run_tcp(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on tcp://{}", listener.local_addr()?);

        loop {
            let (stream, peer) = listener.accept().await?;
            debug!("Connection from {}", peer);
            let (read, write) = stream.into_split();
            self.spawn_session(BufReader::new(read), write);
        }
    }

    async fn run_unix(&self, path: &std::path::Path) -> Result<()> {
        // A stale socket from a previous run blocks the bind
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed stale socket at {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let listener = UnixListener::bind(path)?;
        info!("Listening on unix://{}", path.display());

        loop {
            let (stream, _) = listener.accept().await?;
            debug!("Connection on unix socket");
            let (read, write) = stream.into_split();
            self.spawn_session(BufReader::new(read), write);
        }
    }

    /// One session over stdin/stdout; the server exits when the peer
    /// closes the stream.
    async fn run_stdio(&self) -> Result<()> {
        info!("Serving on stdio");
        let handler = DispatchHandler::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            Arc::clone(&self.loader),
            self.info.clone(),
        )?;
        handler.run().await
    }

    fn spawn_session<R, W>(&self, reader: R, writer: W)
    where
        R: tokio::io::AsyncBufRead + Unpin + Send + 'static,
        W: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        let loader = Arc::clone(&self.loader);
        let info = self.info.clone();
        tokio::spawn(async move {
            let handler = match DispatchHandler::new(reader, writer, loader, info) {
                Ok(handler) => handler,
                Err(e) => {
                    error!("Failed to start session: {e}");
                    return;
                }
            };
            if let Err(e) = handler.run().await {
                error!("Session ended with error: {e}");
            }
        });
    }
}
