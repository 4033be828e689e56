//! 响应构建帮助函数

use actix_web::HttpResponse;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::api::constants::TEXT_PLAIN;
use crate::errors::ShortenerError;

/// 纯文本响应
pub fn text_response(status: actix_web::http::StatusCode, body: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(TEXT_PLAIN)
        .body(body.into())
}

/// JSON 响应
pub fn json_response<T: Serialize>(status: actix_web::http::StatusCode, data: &T) -> HttpResponse {
    HttpResponse::build(status).json(data)
}

/// 从 ShortenerError 构建错误响应（自动映射 HTTP 状态码）
pub fn error_response(err: &ShortenerError) -> HttpResponse {
    if err.is_internal() {
        error!("Request failed: {}", err);
    }
    text_response(err.http_status(), err.message())
}

/// 解析 JSON 请求体，失败时返回校验错误
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ShortenerError> {
    serde_json::from_slice(body)
        .map_err(|e| ShortenerError::validation(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_response_status() {
        let resp = error_response(&ShortenerError::deleted("gone"));
        assert_eq!(resp.status(), StatusCode::GONE);

        let resp = error_response(&ShortenerError::database_operation("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_json_invalid() {
        let err = parse_json::<Vec<String>>(b"{not json").unwrap_err();
        assert!(matches!(err, ShortenerError::Validation(_)));
    }
}
