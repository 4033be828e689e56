use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use tracing::{error, trace};

use super::helpers::text_response;
use crate::api::AppState;

pub struct HealthService;

impl HealthService {
    /// GET /ping - 检查存储后端是否可用
    pub async fn ping(state: web::Data<AppState>) -> impl Responder {
        trace!("Received ping");
        match state.urls.ping().await {
            Ok(()) => text_response(StatusCode::OK, "OK"),
            Err(e) => {
                error!("Storage ping failed: {}", e);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, e.message())
            }
        }
    }
}
