//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting PostgreSQL and SQLite.

mod connection;
mod converters;
mod mutations;
mod query;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{Result, ShortenerError};
use crate::storage::{OwnedUrl, StorageStats, UrlRecord, UrlStorage};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_owned_url, model_to_record, record_to_active_model};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        Ok("postgres".to_string())
    } else {
        Err(ShortenerError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: postgres://, postgresql://, sqlite://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_type: String,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_type: &str, pool_size: u32) -> Result<Self> {
        if database_url.is_empty() {
            return Err(ShortenerError::database_config("DATABASE_DSN is empty"));
        }

        let db = if backend_type == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_type, pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_type: backend_type.to_string(),
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_type.to_uppercase()
        );
        Ok(storage)
    }

    /// 实际使用的数据库类型（sqlite / postgres）
    pub fn backend_type(&self) -> &str {
        &self.backend_type
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl UrlStorage for SeaOrmStorage {
    async fn save(&self, record: &UrlRecord) -> Result<String> {
        self.insert_record(record).await
    }

    async fn load(&self, code: &str) -> Result<String> {
        self.find_original(code).await
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<OwnedUrl>> {
        self.find_by_owner(user_id).await
    }

    async fn delete_bulk(&self, user_id: &str, codes: &[String]) -> Result<()> {
        self.mark_deleted(user_id, codes).await
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(|e| {
            ShortenerError::database_connection(format!("Database ping failed: {}", e))
        })
    }

    async fn stats(&self) -> Result<StorageStats> {
        self.count_stats().await
    }

    fn backend_name(&self) -> &'static str {
        "database"
    }
}
