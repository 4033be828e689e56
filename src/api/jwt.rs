use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Session Token Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 用户 ID（UUID v4）
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// 令牌有效期上限（约十年）
pub const MAX_TOKEN_MINUTES: u64 = 10 * 365 * 24 * 60;

/// JWT Service for issuing and validating session tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_minutes: u64) -> Self {
        let clamped = token_minutes.clamp(1, MAX_TOKEN_MINUTES);
        if clamped != token_minutes {
            warn!(
                "Token TTL of {} minute(s) is out of range, using {}",
                token_minutes, clamped
            );
        }
        let token_minutes = clamped;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_minutes,
        }
    }

    /// Create JwtService from config
    pub fn from_config(auth: &AuthConfig) -> Self {
        // 获取 JWT secret，如果为空则生成一个安全的随机值
        let secret = if auth.jwt_secret.is_empty() {
            warn!("JWT secret not configured, generating a random one; sessions will not survive restarts");
            crate::utils::generate_secure_token(32)
        } else {
            auth.jwt_secret.clone()
        };

        Self::new(&secret, auth.token_ttl_minutes)
    }

    pub fn token_minutes(&self) -> u64 {
        self.token_minutes
    }

    /// 为指定用户签发令牌
    pub fn issue_token(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.token_minutes as i64)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// 生成新的匿名身份，返回 (user_id, token)
    pub fn new_identity(&self) -> Result<(String, String), jsonwebtoken::errors::Error> {
        let user_id = Uuid::new_v4().to_string();
        let token = self.issue_token(&user_id)?;
        Ok((user_id, token))
    }

    /// Validate a session token
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        if token_data.claims.sub.is_empty() {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 60)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue_token("user-1").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_new_identity_is_uuid() {
        let service = create_test_service();
        let (user_id, token) = service.new_identity().unwrap();

        assert!(Uuid::parse_str(&user_id).is_ok());
        assert_eq!(service.validate_token(&token).unwrap().sub, user_id);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = JwtService::new("different_secret_key_32_bytes!!", 60);

        let token = service1.issue_token("user-1").unwrap();
        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        // 过期时间超过默认 leeway
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "user-1".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &encoding_key).unwrap();

        let result = service.validate_token(&token);
        assert!(
            result.is_err(),
            "Expected expired token to be rejected, but got: {:?}",
            result
        );
    }

    #[test]
    fn test_empty_subject_rejected() {
        let service = create_test_service();
        let token = service.issue_token("").unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_token_ttl_is_clamped() {
        let service = JwtService::new("test_secret_key_32_bytes_long!!", u64::MAX);
        assert_eq!(service.token_minutes(), MAX_TOKEN_MINUTES);

        let token = service.issue_token("user-1").unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_MINUTES as i64 * 60);

        let service = JwtService::new("test_secret_key_32_bytes_long!!", 0);
        assert_eq!(service.token_minutes(), 1);
    }

    #[test]
    fn test_from_config_generates_secret_when_empty() {
        let auth = AuthConfig::default();
        let a = JwtService::from_config(&auth);
        let b = JwtService::from_config(&auth);

        let token = a.issue_token("user-1").unwrap();
        assert!(a.validate_token(&token).is_ok());
        assert!(b.validate_token(&token).is_err());
    }
}
