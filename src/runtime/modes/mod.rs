//! Mode routing
//!
//! The binary always runs the HTTP server. When built with the `grpc`
//! feature and `grpc.address` is configured, the gRPC server runs next to it.

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "server")]
pub use server::run_server;
