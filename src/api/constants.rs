//! API 模块常量定义

/// 会话 Cookie 默认名称
pub const DEFAULT_SESSION_COOKIE: &str = "auth_token";

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 纯文本响应的 Content-Type
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
