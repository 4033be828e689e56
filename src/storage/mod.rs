//! URL 存储
//!
//! 三种可互换的后端实现同一个 [`UrlStorage`] trait：
//! - `memory`: 进程内 DashMap，重启丢失
//! - `file`: 追加写的 JSON Lines 文件，启动时重放
//! - `database`: SeaORM（PostgreSQL / SQLite），支持软删除和归属

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::errors::Result;

pub mod backend;
pub mod file;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use models::{OwnedUrl, StorageStats, UrlRecord};

#[async_trait]
pub trait UrlStorage: Send + Sync {
    /// 保存记录，返回短码
    ///
    /// 原始 URL 已存在时返回 `Err(AlreadyExists(已有短码))`，不覆盖原记录。
    async fn save(&self, record: &UrlRecord) -> Result<String>;

    /// 按短码查询原始 URL
    ///
    /// 已软删除返回 `Err(Deleted)`，不存在返回 `Err(NotFound)`。
    async fn load(&self, code: &str) -> Result<String>;

    /// 用户名下所有未删除的链接，没有时返回空列表
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<OwnedUrl>>;

    /// 软删除用户名下的一批短码，不属于该用户的短码被忽略
    async fn delete_bulk(&self, user_id: &str, codes: &[String]) -> Result<()>;

    async fn ping(&self) -> Result<()>;

    async fn stats(&self) -> Result<StorageStats>;

    fn backend_name(&self) -> &'static str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// 按配置选择存储后端
    ///
    /// 顺序：database_dsn → file_storage_path → memory。
    /// 数据库连接失败时记录警告并回退到下一种后端。
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn UrlStorage>> {
        let dsn = config.database_dsn.trim();
        if !dsn.is_empty() {
            match Self::create_database(dsn, config.pool_size).await {
                Ok(storage) => return Ok(storage),
                Err(e) => warn!("Database storage unavailable, falling back: {}", e),
            }
        }

        let path = config.file_storage_path.trim();
        if !path.is_empty() {
            let storage = FileStorage::open(path)?;
            info!("Using file storage: {}", path);
            return Ok(Arc::new(storage));
        }

        info!("Using in-memory storage");
        Ok(Arc::new(MemoryStorage::new()))
    }

    async fn create_database(dsn: &str, pool_size: u32) -> Result<Arc<dyn UrlStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(dsn)?;
        let storage = SeaOrmStorage::new(dsn, &backend_type, pool_size).await?;
        Ok(Arc::new(storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_defaults_to_memory() {
        let config = StorageConfig {
            file_storage_path: String::new(),
            database_dsn: String::new(),
            pool_size: 1,
        };
        let storage = StorageFactory::create(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_factory_selects_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        let config = StorageConfig {
            file_storage_path: path.to_string_lossy().to_string(),
            database_dsn: String::new(),
            pool_size: 1,
        };
        let storage = StorageFactory::create(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "file");
    }

    #[tokio::test]
    async fn test_factory_falls_back_on_unknown_dsn() {
        let config = StorageConfig {
            file_storage_path: String::new(),
            database_dsn: "oracle://nowhere".to_string(),
            pool_size: 1,
        };
        let storage = StorageFactory::create(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_factory_selects_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("urls.db");
        let config = StorageConfig {
            file_storage_path: String::new(),
            database_dsn: format!("sqlite://{}?mode=rwc", db_path.display()),
            pool_size: 1,
        };
        let storage = StorageFactory::create(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "database");
    }
}
