//! 用户链接列表与批量删除

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::debug;

use super::helpers::{error_response, json_response, parse_json};
use crate::api::AppState;
use crate::api::middleware::Session;
use crate::errors::ShortenerError;
use crate::shortcode;

pub struct UserUrlsService;

impl UserUrlsService {
    /// GET /api/user/urls
    ///
    /// 新签发的会话没有任何链接，直接返回 204。
    pub async fn list(state: web::Data<AppState>, session: Session) -> impl Responder {
        if session.fresh {
            return HttpResponse::NoContent().finish();
        }

        match state.urls.list_owned(&session.user_id).await {
            Ok(urls) if urls.is_empty() => HttpResponse::NoContent().finish(),
            Ok(urls) => json_response(StatusCode::OK, &urls),
            Err(e) => error_response(&e),
        }
    }

    /// DELETE /api/user/urls - ["code", ...] → 202，异步删除
    pub async fn delete(
        state: web::Data<AppState>,
        session: Session,
        body: web::Bytes,
    ) -> impl Responder {
        if session.fresh {
            return error_response(&ShortenerError::unauthenticated(
                "A valid session is required to delete URLs",
            ));
        }

        let values: Vec<String> = match parse_json(&body) {
            Ok(values) => values,
            Err(e) => return error_response(&e),
        };

        let codes: Vec<String> = values
            .iter()
            .map(|v| shortcode::extract_code(v))
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if codes.is_empty() {
            debug!("Empty delete request from user {}", session.user_id);
            return HttpResponse::Accepted().finish();
        }

        match state.delete_queue.enqueue(&session.user_id, codes) {
            Ok(()) => HttpResponse::Accepted().finish(),
            Err(e) => error_response(&e),
        }
    }
}
