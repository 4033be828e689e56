pub mod ip;

use base64::Engine;

/// 生成安全的随机令牌（URL-safe Base64，无填充）
pub fn generate_secure_token(bytes_len: usize) -> String {
    let bytes: Vec<u8> = (0..bytes_len).map(|_| rand::random::<u8>()).collect();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token() {
        let a = generate_secure_token(32);
        let b = generate_secure_token(32);
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
    }
}
