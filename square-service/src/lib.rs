//! # Square Service
//!
//! Generated bindings for the `square.v1` package: the message types, the
//! `SquareService` server trait and the typed client.
//!
//! The encoded descriptor set is exported as [`FILE_DESCRIPTOR_SET`] so a server can
//! publish the schema through gRPC server reflection.

pub mod pb {
    include!(concat!(env!("OUT_DIR"), "/square.v1.rs"));
}

pub use pb::square_service_client::SquareServiceClient;
pub use pb::square_service_server::{SquareService, SquareServiceServer};

/// Fully qualified name of the service, as advertised over reflection.
pub const SERVICE_NAME: &str = "square.v1.SquareService";

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("square_descriptors");
