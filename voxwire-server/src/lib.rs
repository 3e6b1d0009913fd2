//! Voxwire speech-to-text server
//!
//! Serves the event protocol from `voxwire-events` over a unix
//! socket, TCP socket, or stdio. Each connection gets its own
//! [`DispatchHandler`] session; all sessions share one
//! [`ModelLoader`] that lazily constructs and caches one backend
//! adapter per (library, model) pair.

pub mod config;
pub mod error;
pub mod handler;
pub mod info;
pub mod loader;
pub mod server;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use handler::DispatchHandler;
pub use info::describe_info;
pub use loader::{AdapterFactory, BackendKey, LoaderSettings, ModelLoader, SharedTranscriber};
pub use server::{BindAddress, Server};
