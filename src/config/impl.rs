use std::sync::OnceLock;

use super::AppConfig;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global configuration instance
///
/// # Panics
/// If called before [`init_config`].
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

/// Try to get the global configuration without panicking
pub fn try_get_config() -> Option<&'static AppConfig> {
    CONFIG.get()
}

/// Initialize the global configuration
///
/// 只有第一次调用生效，之后返回已存在的实例。
pub fn init_config(config: AppConfig) -> &'static AppConfig {
    CONFIG.get_or_init(|| config)
}
