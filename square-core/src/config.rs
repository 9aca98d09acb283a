//! # Configuration
//!
//! Connection parameters for the server and the client. The defaults reproduce the
//! development setup: the server listens on every interface on port `50051`, the client
//! connects to `localhost:50051`, and neither side uses TLS.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_CLIENT_HOST: &str = "localhost";
pub const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// PEM files used by the server to terminate TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTls {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// `None` serves plaintext HTTP/2.
    pub tls: Option<ServerTls>,
    /// Whether to expose the `grpc.reflection.v1` service next to `SquareService`.
    pub reflection: bool,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST,
            port: DEFAULT_PORT,
            tls: None,
            reflection: true,
        }
    }
}

/// Trust settings used by the client when the server speaks TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTls {
    /// PEM bundle of the certificate authority that signed the server certificate.
    pub ca_cert: PathBuf,
    /// Name to verify the server certificate against. Defaults to the host.
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub tls: Option<ClientTls>,
}

impl ClientConfig {
    /// The URI the client dials, e.g. `http://localhost:50051`.
    pub fn url(&self) -> String {
        let scheme = if self.tls.is_some() { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// The name the server certificate must carry.
    pub fn tls_domain(&self) -> Option<&str> {
        self.tls
            .as_ref()
            .map(|tls| tls.domain.as_deref().unwrap_or(&self.host))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CLIENT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults_listen_on_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.addr().to_string(), "0.0.0.0:50051");
        assert!(config.tls.is_none());
        assert!(config.reflection);
    }

    #[test]
    fn plaintext_client_uses_http_scheme() {
        let config = ClientConfig::default();
        assert_eq!(config.url(), "http://localhost:50051");
        assert_eq!(config.tls_domain(), None);
    }

    #[test]
    fn tls_client_uses_https_and_falls_back_to_host_as_domain() {
        let mut config = ClientConfig {
            host: "square.internal".to_string(),
            port: 8443,
            tls: Some(ClientTls {
                ca_cert: PathBuf::from("ca.pem"),
                domain: None,
            }),
        };
        assert_eq!(config.url(), "https://square.internal:8443");
        assert_eq!(config.tls_domain(), Some("square.internal"));

        config.tls.as_mut().unwrap().domain = Some("square.example.com".to_string());
        assert_eq!(config.tls_domain(), Some("square.example.com"));
    }
}
