//! # Square Client
//!
//! Typed client for `square.v1.SquareService`.
//!
//! Unary calls map one number to its square. Streaming calls run a *session*: the
//! client tags every request with the session's [`CorrelationId`], writes them in
//! order, and reads the tagged responses concurrently. The outbound numbers are a
//! stream that the transport polls on its own, so writing never waits on reading.
//!
//! ## Example
//!
//! ```rust,no_run
//! use square_core::{SquareClient, config::ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = SquareClient::connect(&ClientConfig::default()).await?;
//!
//! let squared = client.square(10.2).await?;
//!
//! client
//!     .square_stream([1.0, 2.0, 3.0], |uid, number| println!("{uid}: {number}"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
mod stream;

pub use stream::SquareStream;

use crate::{BoxError, CorrelationId, config::ClientConfig};
use futures_util::{Stream, StreamExt};
use http_body::Body as HttpBody;
use square_service::SquareServiceClient;
use square_service::pb::{SquareRequest, SquareStreamRequest};
use std::path::PathBuf;
use tonic::{
    client::GrpcService,
    transport::{Certificate, Channel, ClientTlsConfig, Endpoint},
};
use tracing::debug;

/// Errors that can occur when connecting to a Square server.
#[derive(Debug, thiserror::Error)]
pub enum ClientConnectError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Failed to read TLS file '{}': {source}", path.display())]
    TlsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid TLS configuration: {0}")]
    Tls(#[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
}

/// Errors that can occur during a unary call or a streaming session.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("gRPC call failed: code={:?} message={:?}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),
    #[error("Stream '{expected}' received a response tagged '{received}'")]
    CorrelationMismatch {
        expected: CorrelationId,
        received: String,
    },
}

#[derive(Debug, Clone)]
pub struct SquareClient<S = Channel> {
    inner: SquareServiceClient<S>,
}

impl SquareClient<Channel> {
    /// Connects to the server described by `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(SquareClient)` - The connected client.
    /// * `Err(ClientConnectError)` - If the URL or TLS material is invalid, or the
    ///   connection fails.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientConnectError> {
        let url = config.url();

        let mut endpoint = Endpoint::new(url.clone())
            .map_err(|e| ClientConnectError::InvalidUrl(url.clone(), e))?;

        if let Some(tls) = &config.tls {
            let ca = std::fs::read(&tls.ca_cert).map_err(|source| {
                ClientConnectError::TlsFile {
                    path: tls.ca_cert.clone(),
                    source,
                }
            })?;

            let mut tls_config =
                ClientTlsConfig::new().ca_certificate(Certificate::from_pem(ca));
            if let Some(domain) = config.tls_domain() {
                tls_config = tls_config.domain_name(domain);
            }

            endpoint = endpoint
                .tls_config(tls_config)
                .map_err(ClientConnectError::Tls)?;
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ClientConnectError::ConnectionFailed(url.clone(), e))?;

        debug!(%url, "connected");
        Ok(Self::from_service(channel))
    }
}

impl<S> SquareClient<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Creates a client from an existing Tonic service/channel.
    pub fn from_service(service: S) -> Self {
        Self {
            inner: SquareServiceClient::new(service),
        }
    }

    /// Performs the unary `Square` call.
    pub async fn square(&mut self, number: f64) -> Result<f64, CallError> {
        let response = self
            .inner
            .square(SquareRequest {
                number: Some(number),
            })
            .await?;

        Ok(response.into_inner().number)
    }

    /// Opens a `SquareStream` session tagged with `id`.
    ///
    /// Every number yielded by `numbers` is sent in order; when `numbers` ends the
    /// send direction is half-closed. Responses are read from the returned
    /// [`SquareStream`].
    pub async fn open_stream<N>(
        &mut self,
        id: CorrelationId,
        numbers: N,
    ) -> Result<SquareStream, CallError>
    where
        N: Stream<Item = f64> + Send + 'static,
    {
        let uid = id.to_string();
        let outbound = numbers.map(move |number| SquareStreamRequest {
            number: Some(number),
            uid: uid.clone(),
        });

        let inbound = self.inner.square_stream(outbound).await?.into_inner();
        debug!(uid = %id, "stream opened");

        Ok(SquareStream::new(id, inbound))
    }

    /// Runs a full streaming session under a freshly generated correlation id.
    ///
    /// `on_response` is called once per response, in arrival order. Returns the
    /// number of responses received before the server closed the stream.
    pub async fn square_stream<I, F>(
        &mut self,
        numbers: I,
        on_response: F,
    ) -> Result<usize, CallError>
    where
        I: IntoIterator<Item = f64>,
        F: FnMut(&CorrelationId, f64),
    {
        self.square_stream_with_id(CorrelationId::generate(), numbers, on_response)
            .await
    }

    /// Same as [`SquareClient::square_stream`] with a caller-chosen correlation id.
    pub async fn square_stream_with_id<I, F>(
        &mut self,
        id: CorrelationId,
        numbers: I,
        mut on_response: F,
    ) -> Result<usize, CallError>
    where
        I: IntoIterator<Item = f64>,
        F: FnMut(&CorrelationId, f64),
    {
        let numbers: Vec<f64> = numbers.into_iter().collect();
        let sent = numbers.len();

        let mut session = self
            .open_stream(id, futures_util::stream::iter(numbers))
            .await?;

        while let Some(number) = session.message().await? {
            on_response(session.correlation_id(), number);
        }

        debug!(
            uid = %session.correlation_id(),
            sent,
            received = session.received(),
            "stream session finished"
        );
        Ok(session.received())
    }
}
