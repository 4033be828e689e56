//! 短码生成
//!
//! 短码由原始 URL 确定性地派生：SHA-256 摘要取前 128 位，
//! 再用 URL-safe Base64（无填充）编码，固定 22 个字符。

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

/// 参与编码的摘要字节数（128 bits）
const DIGEST_BYTES: usize = 16;

/// 短码长度
pub const SHORT_CODE_LEN: usize = 22;

/// 允许外部传入的短码最大长度
pub const MAX_SHORT_CODE_LEN: usize = 64;

/// Derive the short code for an original URL.
pub fn derive(original_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_url.as_bytes());
    let digest = hasher.finalize();
    URL_SAFE_NO_PAD.encode(&digest[..DIGEST_BYTES])
}

/// 校验短码格式（仅允许 URL-safe Base64 字符）
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// 拼接完整短链接
pub fn expand(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

/// 从短码或完整短链接中取出短码（最后一个路径段）
pub fn extract_code(value: &str) -> &str {
    let trimmed = value.trim().trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, last)) => last,
        None => trimmed,
    }
}
