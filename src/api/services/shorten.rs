//! 短链接创建接口

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::helpers::{error_response, json_response, parse_json, text_response};
use crate::api::AppState;
use crate::api::middleware::Session;
use crate::services::{BatchItem, ShortenOutcome};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub result: String,
}

fn outcome_status(outcome: &ShortenOutcome) -> StatusCode {
    if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

pub struct ShortenService;

impl ShortenService {
    /// POST / - 请求体为原始 URL 文本
    pub async fn shorten_text(
        state: web::Data<AppState>,
        session: Session,
        body: web::Bytes,
    ) -> impl Responder {
        let Ok(text) = std::str::from_utf8(&body) else {
            return text_response(StatusCode::BAD_REQUEST, "Body must be valid UTF-8");
        };

        // 空请求体返回 201 且不带内容
        if text.trim().is_empty() {
            trace!("Empty body on POST /, nothing to shorten");
            return HttpResponse::Created().finish();
        }

        match state.urls.shorten(text, &session.user_id, None).await {
            Ok(outcome) => text_response(outcome_status(&outcome), outcome.into_short_url()),
            Err(e) => error_response(&e),
        }
    }

    /// POST /api/shorten - {"url": "..."} → {"result": "..."}
    pub async fn shorten_json(
        state: web::Data<AppState>,
        session: Session,
        body: web::Bytes,
    ) -> impl Responder {
        let request: ShortenRequest = match parse_json(&body) {
            Ok(request) => request,
            Err(e) => return error_response(&e),
        };

        match state.urls.shorten(&request.url, &session.user_id, None).await {
            Ok(outcome) => {
                let status = outcome_status(&outcome);
                json_response(
                    status,
                    &ShortenResponse {
                        result: outcome.into_short_url(),
                    },
                )
            }
            Err(e) => error_response(&e),
        }
    }

    /// POST /api/shorten/batch
    pub async fn shorten_batch(
        state: web::Data<AppState>,
        session: Session,
        body: web::Bytes,
    ) -> impl Responder {
        let items: Vec<BatchItem> = match parse_json(&body) {
            Ok(items) => items,
            Err(e) => return error_response(&e),
        };

        match state.urls.shorten_batch(&session.user_id, items).await {
            Ok(results) => json_response(StatusCode::CREATED, &results),
            Err(e) => error_response(&e),
        }
    }
}
