//! gRPC 接口
//!
//! 与 HTTP 接口共享同一个 `UrlService` 和删除队列，
//! 身份通过 `authorization: Bearer <token>` 或 cookie 元数据传递。

pub mod auth;
pub mod server;

pub mod proto {
    tonic::include_proto!("shortener.v1");
}

pub use server::{GrpcShortener, serve};

use tonic::Status;

use crate::errors::ShortenerError;

impl From<ShortenerError> for Status {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::Validation(msg) => Status::invalid_argument(msg),
            ShortenerError::AlreadyExists(code) => Status::already_exists(code),
            ShortenerError::NotFound(msg) | ShortenerError::Deleted(msg) => Status::not_found(msg),
            ShortenerError::Unauthenticated(msg) | ShortenerError::Token(msg) => {
                Status::unauthenticated(msg)
            }
            ShortenerError::Forbidden(msg) => Status::permission_denied(msg),
            ShortenerError::QueueFull(msg) => Status::unavailable(msg),
            other => {
                tracing::error!("gRPC internal error: {}", other);
                Status::internal("Internal server error")
            }
        }
    }
}
