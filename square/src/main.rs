//! # Square CLI Entry Point
//!
//! Runs either side of the `square.v1.SquareService` gRPC service:
//!
//! 1. **serve**: binds the listening address and serves until Ctrl-C.
//! 2. **call**: squares one number with a unary call.
//! 3. **stream**: squares a sequence of numbers over one bidirectional session and
//!    prints each response as it arrives.
//!
//! Logs go to standard error and are filtered with `RUST_LOG` (default `info`).

mod cli;
mod formatter;

use clap::Parser;
use cli::{Cli, Commands, ConnectArgs, ServeArgs};
use formatter::{FormattedString, GenericError, Squared, StreamItem};
use square_core::config::{ClientConfig, ServerConfig};
use square_core::{CorrelationId, SquareClient, SquareServer};
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Cli::parse();

    match args.command {
        Commands::Serve(serve) => run_server(serve).await,
        Commands::Call { connection, number } => run_call(connection, number).await,
        Commands::Stream {
            connection,
            uid,
            numbers,
        } => run_stream(connection, uid, numbers).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_server(args: ServeArgs) {
    let config = ServerConfig::from(args);

    // A bind failure is fatal: report it and exit instead of running half-initialized.
    let server = match SquareServer::bind(&config).await {
        Ok(server) => server,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl-C, shutting down"),
            Err(err) => warn!(%err, "failed to listen for Ctrl-C, shutting down"),
        }
    };

    if let Err(err) = server.serve_with_shutdown(shutdown).await {
        eprintln!("{}", FormattedString::from(err));
        process::exit(1);
    }
}

async fn connect_or_exit(args: ConnectArgs) -> SquareClient {
    let config = ClientConfig::from(args);

    match SquareClient::connect(&config).await {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

async fn run_call(args: ConnectArgs, number: f64) {
    let mut client = connect_or_exit(args).await;

    match client.square(number).await {
        Ok(squared) => print!("{}", FormattedString::from(Squared(squared))),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

async fn run_stream(args: ConnectArgs, uid: Option<String>, numbers: Vec<f64>) {
    let id = match uid {
        Some(uid) if uid.trim().is_empty() => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError("Invalid correlation id", "it cannot be empty"))
            );
            process::exit(1);
        }
        Some(uid) => CorrelationId::from(uid),
        None => CorrelationId::generate(),
    };

    let mut client = connect_or_exit(args).await;

    info!(uid = %id, count = numbers.len(), "opening stream");

    let result = client
        .square_stream_with_id(id.clone(), numbers, |uid, number| {
            print!("{}", FormattedString::from(StreamItem(uid, number)))
        })
        .await;

    match result {
        Ok(received) => info!(uid = %id, received, "stream closed"),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}
