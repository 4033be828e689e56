//! HTTP API
//!
//! 路由注册与共享状态。中间件和具体处理函数分别位于 `middleware` 和 `services`。

pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use actix_web::web;

use crate::services::{DeleteQueue, UrlService};
use services::{HealthService, RedirectService, ShortenService, StatsService, UserUrlsService};

/// 所有处理函数共享的状态
#[derive(Clone)]
pub struct AppState {
    pub urls: Arc<UrlService>,
    pub delete_queue: DeleteQueue,
    /// 允许访问统计接口的 CIDR，空表示禁止
    pub trusted_subnet: String,
}

impl AppState {
    pub fn new(urls: Arc<UrlService>, delete_queue: DeleteQueue, trusted_subnet: String) -> Self {
        Self {
            urls,
            delete_queue,
            trusted_subnet,
        }
    }
}

/// 注册全部路由
///
/// 固定路径需要在 `/{code}` 之前注册。
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(HealthService::ping))
        .route("/api/shorten", web::post().to(ShortenService::shorten_json))
        .route(
            "/api/shorten/batch",
            web::post().to(ShortenService::shorten_batch),
        )
        .route("/api/user/urls", web::get().to(UserUrlsService::list))
        .route("/api/user/urls", web::delete().to(UserUrlsService::delete))
        .route("/api/internal/stats", web::get().to(StatsService::stats))
        .route("/", web::post().to(ShortenService::shorten_text))
        .route("/", web::get().to(RedirectService::missing_code))
        .route("/{code}", web::get().to(RedirectService::handle_redirect));
}
