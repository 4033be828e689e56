//! System-level modules
//!
//! - Logging initialization
//! - Build information

pub mod logging;

use tracing::info;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 构建日期，编译时未提供则为 N/A
pub fn build_date() -> &'static str {
    option_env!("SHORTENER_BUILD_DATE").unwrap_or("N/A")
}

/// 构建提交，编译时未提供则为 N/A
pub fn build_commit() -> &'static str {
    option_env!("SHORTENER_BUILD_COMMIT").unwrap_or("N/A")
}

/// 启动时输出构建信息
pub fn log_build_info() {
    info!("Build version: {}", VERSION);
    info!("Build date: {}", build_date());
    info!("Build commit: {}", build_commit());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_never_empty() {
        assert!(!VERSION.is_empty());
        assert!(!build_date().is_empty());
        assert!(!build_commit().is_empty());
    }
}
