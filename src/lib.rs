//! Shortener - a URL shortening service
//!
//! Short codes are derived from the original URL, so shortening the same
//! URL twice yields the same short link. Links belong to the anonymous
//! session that created them and can be soft-deleted by their owner.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **grpc**: gRPC interface next to the HTTP server (requires `protoc`)
//! - **full**: All features enabled
//!
//! # Architecture
//! - `shortcode`: Short code derivation
//! - `storage`: Storage backends (memory, JSON lines file, SQL database)
//! - `services`: Business logic and the asynchronous delete queue
//! - `api`: HTTP handlers, session tokens and middleware
//! - `grpc`: gRPC service
//! - `config`: Configuration loading
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and build information

pub mod api;
pub mod config;
pub mod errors;
#[cfg(feature = "grpc")]
pub mod grpc;
pub mod runtime;
pub mod services;
pub mod shortcode;
pub mod storage;
pub mod system;
pub mod utils;
