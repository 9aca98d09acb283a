//! # Square Server
//!
//! Hosts [`SquareResponder`] over HTTP/2.
//!
//! Binding and serving are two steps so that a bind failure surfaces as
//! [`ServerError::Bind`] before anything is served, and so that callers binding port
//! `0` can read the assigned address through [`SquareServer::local_addr`].
//!
//! ```rust,no_run
//! use square_core::{SquareServer, config::ServerConfig};
//!
//! # async fn run() -> Result<(), square_core::ServerError> {
//! let server = SquareServer::bind(&ServerConfig::default()).await?;
//! server.serve_with_shutdown(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```
pub mod responder;
pub mod session;

pub use responder::SquareResponder;

use crate::config::{ServerConfig, ServerTls};
use square_service::{FILE_DESCRIPTOR_SET, SERVICE_NAME, SquareServiceServer};
use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind '{addr}': {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read TLS file '{}': {source}", path.display())]
    TlsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid TLS configuration: {0}")]
    Tls(#[source] tonic::transport::Error),
    #[error("Failed to build the reflection service: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),
    #[error("Server transport failed: {0}")]
    Transport(#[source] tonic::transport::Error),
}

/// A bound, not yet serving, Square server.
pub struct SquareServer {
    listener: TcpListener,
    tls: Option<ServerTlsConfig>,
    reflection: bool,
    responder: SquareResponder,
}

impl SquareServer {
    /// Acquires the listening address and loads TLS material.
    ///
    /// # Returns
    ///
    /// * `Ok(SquareServer)` - Ready to serve.
    /// * `Err(ServerError::Bind)` - The address is unavailable.
    /// * `Err(ServerError::TlsFile)` - A certificate or key could not be read.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let tls = config.tls.as_ref().map(load_identity).transpose()?;

        let addr = config.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            tls,
            reflection: config.reflection,
            responder: SquareResponder::default(),
        })
    }

    /// Replaces the responder, e.g. to tune its per-session buffer.
    pub fn with_responder(mut self, responder: SquareResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until `signal` completes, then stops accepting and lets in-flight calls
    /// finish.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr().ok();

        let mut builder = Server::builder();
        if let Some(tls) = self.tls {
            builder = builder.tls_config(tls).map_err(ServerError::Tls)?;
        }

        let reflection = if self.reflection {
            Some(
                tonic_reflection::server::Builder::configure()
                    .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
                    .build_v1()?,
            )
        } else {
            None
        };

        let router = builder
            .add_service(SquareServiceServer::new(self.responder))
            .add_optional_service(reflection);

        info!(
            ?addr,
            service = SERVICE_NAME,
            reflection = self.reflection,
            "square server listening"
        );

        router
            .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), signal)
            .await
            .map_err(ServerError::Transport)?;

        info!(?addr, "square server stopped");
        Ok(())
    }
}

impl fmt::Debug for SquareServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SquareServer")
            .field("listener", &self.listener)
            .field("tls", &self.tls.is_some())
            .field("reflection", &self.reflection)
            .field("responder", &self.responder)
            .finish()
    }
}

fn load_identity(tls: &ServerTls) -> Result<ServerTlsConfig, ServerError> {
    let cert = read_pem(&tls.cert)?;
    let key = read_pem(&tls.key)?;
    Ok(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ServerError> {
    std::fs::read(path).map_err(|source| ServerError::TlsFile {
        path: path.to_path_buf(),
        source,
    })
}
