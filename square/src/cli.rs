//! # CLI
//!
//! This module defines the command-line interface of `square` using `clap`.
//!
//! Every connection option can also be supplied through a `SQUARE_*` environment variable.
use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use square_core::config::{
    ClientConfig, ClientTls, DEFAULT_CLIENT_HOST, DEFAULT_PORT, DEFAULT_SERVER_HOST, ServerConfig,
    ServerTls,
};

#[derive(Parser)]
#[command(name = "square", version, about = "Square numbers over gRPC")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the SquareService server until Ctrl-C
    Serve(ServeArgs),

    /// Square a single number with a unary call
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// square call 10.2
    /// ```
    Call {
        #[command(flatten)]
        connection: ConnectArgs,

        #[arg(allow_negative_numbers = true, value_parser = parse_number)]
        number: f64,
    },

    /// Square a sequence of numbers over one bidirectional stream
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// square stream 1 2 3 4 5
    /// ```
    Stream {
        #[command(flatten)]
        connection: ConnectArgs,

        /// Correlation id of the session (a random UUID when omitted)
        #[arg(long)]
        uid: Option<String>,

        #[arg(allow_negative_numbers = true, value_parser = parse_number)]
        numbers: Vec<f64>,
    },
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SQUARE_HOST", default_value_t = DEFAULT_SERVER_HOST)]
    pub host: IpAddr,

    #[arg(long, env = "SQUARE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// PEM certificate chain; enables TLS together with --tls-key
    #[arg(long, env = "SQUARE_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, env = "SQUARE_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Do not expose the gRPC reflection service
    #[arg(long)]
    pub no_reflection: bool,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        let tls = match (args.tls_cert, args.tls_key) {
            (Some(cert), Some(key)) => Some(ServerTls { cert, key }),
            _ => None,
        };

        ServerConfig {
            host: args.host,
            port: args.port,
            tls,
            reflection: !args.no_reflection,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server host name or address
    #[arg(long, env = "SQUARE_HOST", default_value = DEFAULT_CLIENT_HOST)]
    pub host: String,

    #[arg(long, env = "SQUARE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// PEM bundle of the CA that signed the server certificate; enables TLS
    #[arg(long, env = "SQUARE_TLS_CA")]
    pub tls_ca: Option<PathBuf>,

    /// Name to verify the server certificate against (defaults to --host)
    #[arg(long, env = "SQUARE_TLS_DOMAIN", requires = "tls_ca")]
    pub tls_domain: Option<String>,
}

impl From<ConnectArgs> for ClientConfig {
    fn from(args: ConnectArgs) -> Self {
        let tls = args.tls_ca.map(|ca_cert| ClientTls {
            ca_cert,
            domain: args.tls_domain,
        });

        ClientConfig {
            host: args.host,
            port: args.port,
            tls,
        }
    }
}

fn parse_number(value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid number '{value}': {e}"))
}
