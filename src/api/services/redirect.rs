use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use super::helpers::{error_response, text_response};
use crate::api::AppState;

pub struct RedirectService;

impl RedirectService {
    /// GET /{code} - 307 重定向到原始 URL
    pub async fn handle_redirect(
        path: web::Path<String>,
        state: web::Data<AppState>,
    ) -> impl Responder {
        let code = path.into_inner();
        trace!("Redirect lookup for {}", code);

        match state.urls.resolve(&code).await {
            Ok(original_url) => {
                debug!("Redirecting {} -> {}", code, original_url);
                HttpResponse::TemporaryRedirect()
                    .insert_header((LOCATION, original_url))
                    .finish()
            }
            Err(e) => error_response(&e),
        }
    }

    /// GET / - 缺少短码
    pub async fn missing_code() -> impl Responder {
        text_response(StatusCode::BAD_REQUEST, "Short code is missing")
    }
}
