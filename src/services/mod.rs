//! Service layer for business logic
//!
//! This module provides unified business logic that can be shared between
//! different interfaces (HTTP API, gRPC).

mod delete_queue;
mod url_service;

pub use delete_queue::{DeleteQueue, DeleteTask, DeleteWorker};
pub use url_service::*;
