use serde::{Deserialize, Serialize};

use super::args::CliArgs;

/// 默认配置文件名（不存在时忽略）
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 环境变量前缀，分隔符 __
/// 示例：SHORTENER__SERVER__ADDRESS=0.0.0.0:8080
pub const ENV_PREFIX: &str = "SHORTENER";

/// 应用配置（启动时加载，运行期间只读）
///
/// 优先级：命令行参数 / 知名环境变量 > SHORTENER__* 环境变量 > 配置文件 > 默认值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub grpc: GrpcConfig,
    #[serde(default)]
    pub delete_queue: DeleteQueueConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从配置文件、环境变量和命令行参数加载配置
    pub fn load(args: &CliArgs) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        let file_source = match args.config.as_deref() {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            // 1. 配置文件（TOML / JSON，按扩展名识别）
            .add_source(file_source)
            // 2. 前缀环境变量
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            // 3. 命令行参数和知名环境变量（clap 已合并）
            .set_override_option("server.address", args.server_address.clone())?
            .set_override_option("server.base_url", args.base_url.clone())?
            .set_override_option("server.trusted_subnet", args.trusted_subnet.clone())?
            .set_override_option("storage.file_storage_path", args.file_storage_path.clone())?
            .set_override_option("storage.database_dsn", args.database_dsn.clone())?
            .set_override_option("grpc.address", args.grpc_address.clone())?
            .build()?;

        settings.try_deserialize::<AppConfig>()
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_address")]
    pub address: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 允许访问统计接口的 CIDR，留空表示禁止访问
    #[serde(default)]
    pub trusted_subnet: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// 存储配置
///
/// database_dsn 非空时使用数据库，否则 file_storage_path 非空时使用文件，
/// 都为空时使用内存。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_file_storage_path")]
    pub file_storage_path: String,
    #[serde(default)]
    pub database_dsn: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// 会话令牌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 为空时启动时随机生成（重启后旧令牌失效）
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

/// gRPC 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrpcConfig {
    /// 为空时不启动 gRPC 服务
    #[serde(default)]
    pub address: String,
}

/// 异步删除队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteQueueConfig {
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_address() -> String {
    "localhost:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_file_storage_path() -> String {
    "BaseFile.json".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_token_ttl_minutes() -> u64 {
    60
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
            base_url: default_base_url(),
            trusted_subnet: String::new(),
            workers: default_workers(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file_storage_path: default_file_storage_path(),
            database_dsn: String::new(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl_minutes(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl Default for DeleteQueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
