use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenerError {
    Validation(String),
    NotFound(String),
    Deleted(String),
    /// 原始 URL 已存在，携带已有的短码
    AlreadyExists(String),
    Unauthenticated(String),
    Forbidden(String),
    QueueFull(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Token(String),
    Internal(String),
}

impl ShortenerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::Validation(_) => "E001",
            ShortenerError::NotFound(_) => "E002",
            ShortenerError::Deleted(_) => "E003",
            ShortenerError::AlreadyExists(_) => "E004",
            ShortenerError::Unauthenticated(_) => "E005",
            ShortenerError::Forbidden(_) => "E006",
            ShortenerError::QueueFull(_) => "E007",
            ShortenerError::DatabaseConfig(_) => "E008",
            ShortenerError::DatabaseConnection(_) => "E009",
            ShortenerError::DatabaseOperation(_) => "E010",
            ShortenerError::FileOperation(_) => "E011",
            ShortenerError::Serialization(_) => "E012",
            ShortenerError::Token(_) => "E013",
            ShortenerError::Internal(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortenerError::Validation(_) => "Validation Error",
            ShortenerError::NotFound(_) => "Resource Not Found",
            ShortenerError::Deleted(_) => "Resource Deleted",
            ShortenerError::AlreadyExists(_) => "Resource Already Exists",
            ShortenerError::Unauthenticated(_) => "Unauthenticated",
            ShortenerError::Forbidden(_) => "Forbidden",
            ShortenerError::QueueFull(_) => "Queue Full",
            ShortenerError::DatabaseConfig(_) => "Database Configuration Error",
            ShortenerError::DatabaseConnection(_) => "Database Connection Error",
            ShortenerError::DatabaseOperation(_) => "Database Operation Error",
            ShortenerError::FileOperation(_) => "File Operation Error",
            ShortenerError::Serialization(_) => "Serialization Error",
            ShortenerError::Token(_) => "Token Error",
            ShortenerError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortenerError::Validation(msg)
            | ShortenerError::NotFound(msg)
            | ShortenerError::Deleted(msg)
            | ShortenerError::AlreadyExists(msg)
            | ShortenerError::Unauthenticated(msg)
            | ShortenerError::Forbidden(msg)
            | ShortenerError::QueueFull(msg)
            | ShortenerError::DatabaseConfig(msg)
            | ShortenerError::DatabaseConnection(msg)
            | ShortenerError::DatabaseOperation(msg)
            | ShortenerError::FileOperation(msg)
            | ShortenerError::Serialization(msg)
            | ShortenerError::Token(msg)
            | ShortenerError::Internal(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    ///
    /// 未知短码按 400 处理，与重定向接口的约定一致。
    pub fn http_status(&self) -> StatusCode {
        match self {
            ShortenerError::Validation(_) | ShortenerError::NotFound(_) => StatusCode::BAD_REQUEST,
            ShortenerError::Unauthenticated(_) | ShortenerError::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            ShortenerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ShortenerError::AlreadyExists(_) => StatusCode::CONFLICT,
            ShortenerError::Deleted(_) => StatusCode::GONE,
            ShortenerError::QueueFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为存储/内部错误（需要记录日志）
    pub fn is_internal(&self) -> bool {
        self.http_status() == StatusCode::INTERNAL_SERVER_ERROR
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortenerError {}

// 便捷的构造函数
impl ShortenerError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotFound(msg.into())
    }

    pub fn deleted<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Deleted(msg.into())
    }

    pub fn already_exists<T: Into<String>>(code: T) -> Self {
        ShortenerError::AlreadyExists(code.into())
    }

    pub fn unauthenticated<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Unauthenticated(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Forbidden(msg.into())
    }

    pub fn queue_full<T: Into<String>>(msg: T) -> Self {
        ShortenerError::QueueFull(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Serialization(msg.into())
    }

    pub fn token<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Token(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Internal(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShortenerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortenerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShortenerError {
    fn from(err: std::io::Error) -> Self {
        ShortenerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortenerError {
    fn from(err: serde_json::Error) -> Self {
        ShortenerError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ShortenerError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ShortenerError::Token(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;
