use std::env::var;
use std::io::Result;

fn main() -> Result<()> {
    let proto_files = &["proto/square/v1/square.proto"];

    // Name of the folder containing the proto definitions
    let proto_folder = "proto";
    let out_dir = var("OUT_DIR").expect("Missing OUT_DIR environment variable");
    let descriptors_path = format!("{}/square_descriptors.bin", out_dir);

    println!("cargo:rerun-if-changed={}", proto_folder);

    tonic_prost_build::configure()
        .file_descriptor_set_path(descriptors_path)
        .protoc_arg("--experimental_allow_proto3_optional")
        .compile_protos(proto_files, &[proto_folder])?;

    Ok(())
}
