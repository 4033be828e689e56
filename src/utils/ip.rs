//! IP 地址处理工具
//!
//! 统计接口只对可信子网开放：调用方 IP 取自 X-Real-IP（HTTP 头或 gRPC metadata），
//! 再与配置的 CIDR 做前缀匹配。

use std::net::IpAddr;

use actix_web::http::header::HeaderMap;

/// X-Real-IP 头名称（小写，HTTP 头和 gRPC metadata 通用）
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.trim().split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false, // IPv4 vs IPv6 不匹配
    }
}

/// 校验 CIDR 格式
pub fn is_valid_cidr(cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.trim().split_once('/') else {
        return false;
    };
    match (network.parse::<IpAddr>(), prefix_len.parse::<u8>()) {
        (Ok(IpAddr::V4(_)), Ok(len)) => len <= 32,
        (Ok(IpAddr::V6(_)), Ok(len)) => len <= 128,
        _ => false,
    }
}

/// 判断调用方是否位于可信子网
///
/// 未配置子网、缺少 IP 或 IP 无法解析时一律拒绝。
pub fn is_trusted_client(real_ip: Option<&str>, trusted_subnet: &str) -> bool {
    if trusted_subnet.trim().is_empty() {
        return false;
    }
    let Some(ip) = real_ip.and_then(|s| s.trim().parse::<IpAddr>().ok()) else {
        return false;
    };
    ip_in_cidr(&ip, trusted_subnet)
}

/// 从 HeaderMap 提取 X-Real-IP
pub fn extract_real_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REAL_IP_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    #[test]
    fn test_ip_in_cidr_ipv4() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
    }

    #[test]
    fn test_ip_in_cidr_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
    }

    #[test]
    fn test_ip_in_cidr_zero_prefix() {
        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        assert!(ip_in_cidr(&ip, "0.0.0.0/0"));
    }

    #[test]
    fn test_is_valid_cidr() {
        assert!(is_valid_cidr("10.0.0.0/8"));
        assert!(is_valid_cidr("::1/128"));
        assert!(!is_valid_cidr("10.0.0.0"));
        assert!(!is_valid_cidr("10.0.0.0/33"));
        assert!(!is_valid_cidr("not-an-ip/8"));
    }

    #[test]
    fn test_is_trusted_client() {
        assert!(is_trusted_client(Some("10.1.2.3"), "10.0.0.0/8"));
        assert!(!is_trusted_client(Some("11.1.2.3"), "10.0.0.0/8"));
        assert!(!is_trusted_client(None, "10.0.0.0/8"));
        assert!(!is_trusted_client(Some("garbage"), "10.0.0.0/8"));
        // 未配置子网时总是拒绝
        assert!(!is_trusted_client(Some("10.1.2.3"), ""));
    }

    #[test]
    fn test_extract_real_ip_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_real_ip_from_headers(&headers), None);

        headers.insert(
            HeaderName::from_static(REAL_IP_HEADER),
            HeaderValue::from_static(" 10.0.0.7 "),
        );
        assert_eq!(
            extract_real_ip_from_headers(&headers),
            Some("10.0.0.7".to_string())
        );
    }
}
