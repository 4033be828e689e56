use tonic::metadata::MetadataMap;

use crate::api::jwt::JwtService;
use crate::errors::{Result, ShortenerError};

pub const AUTHORIZATION: &str = "authorization";
pub const COOKIE: &str = "cookie";
pub const REAL_IP: &str = "x-real-ip";

/// 从元数据中取出会话令牌
///
/// 优先 `authorization: Bearer <token>`，其次 cookie 中的会话项。
pub fn extract_token(metadata: &MetadataMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = metadata.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    metadata
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    /// 本次调用新签发的令牌（需要回传给客户端）
    pub issued_token: Option<String>,
}

/// 解析调用者，令牌缺失或无效时签发新身份
pub fn caller_or_new(jwt: &JwtService, metadata: &MetadataMap, cookie_name: &str) -> Result<Caller> {
    if let Some(token) = extract_token(metadata, cookie_name)
        && let Ok(claims) = jwt.validate_token(&token)
    {
        return Ok(Caller {
            user_id: claims.sub,
            issued_token: None,
        });
    }

    let (user_id, token) = jwt.new_identity()?;
    Ok(Caller {
        user_id,
        issued_token: Some(token),
    })
}

/// 解析调用者，要求已有有效令牌
pub fn require_caller(jwt: &JwtService, metadata: &MetadataMap, cookie_name: &str) -> Result<String> {
    let token = extract_token(metadata, cookie_name)
        .ok_or_else(|| ShortenerError::unauthenticated("Missing session token"))?;
    let claims = jwt
        .validate_token(&token)
        .map_err(|e| ShortenerError::unauthenticated(format!("Invalid session token: {}", e)))?;
    Ok(claims.sub)
}

pub fn real_ip(metadata: &MetadataMap) -> Option<String> {
    metadata
        .get(REAL_IP)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
