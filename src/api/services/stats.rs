use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, web};
use tracing::warn;

use super::helpers::{error_response, json_response};
use crate::api::AppState;
use crate::errors::ShortenerError;
use crate::utils::ip::{extract_real_ip_from_headers, is_trusted_client};

pub struct StatsService;

impl StatsService {
    /// GET /api/internal/stats - 仅可信子网可访问
    pub async fn stats(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
        let real_ip = extract_real_ip_from_headers(req.headers());
        if !is_trusted_client(real_ip.as_deref(), &state.trusted_subnet) {
            warn!(
                "Rejected stats request from {}",
                real_ip.as_deref().unwrap_or("<unknown>")
            );
            return error_response(&ShortenerError::forbidden(
                "Caller is not in the trusted subnet",
            ));
        }

        match state.urls.stats().await {
            Ok(stats) => json_response(StatusCode::OK, &stats),
            Err(e) => error_response(&e),
        }
    }
}
