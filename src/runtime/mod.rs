//! Application runtime
//!
//! - `lifetime`: startup wiring and graceful shutdown
//! - `modes`: execution modes (HTTP server, optional gRPC)

pub mod lifetime;
pub mod modes;
