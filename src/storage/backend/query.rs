//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::SeaOrmStorage;
use super::converters::{model_to_owned_url, model_to_record};
use crate::errors::{Result, ShortenerError};
use crate::storage::{OwnedUrl, StorageStats, UrlRecord};

use migration::entities::short_url;

impl SeaOrmStorage {
    pub async fn find_record(&self, code: &str) -> Result<Option<UrlRecord>> {
        let model = short_url::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ShortenerError::database_operation(format!("Query failed: {}", e)))?;
        Ok(model.map(model_to_record))
    }

    pub(super) async fn find_original(&self, code: &str) -> Result<String> {
        match self.find_record(code).await? {
            Some(record) if record.is_deleted => {
                Err(ShortenerError::deleted(format!("Short URL deleted: {}", code)))
            }
            Some(record) => Ok(record.original_url),
            None => Err(ShortenerError::not_found(format!(
                "Short URL not found: {}",
                code
            ))),
        }
    }

    /// 按原始 URL 查询已有短码（冲突时使用）
    pub(super) async fn find_code_by_url(&self, original_url: &str) -> Result<Option<String>> {
        short_url::Entity::find()
            .select_only()
            .column(short_url::Column::ShortCode)
            .filter(short_url::Column::OriginalUrl.eq(original_url))
            .into_tuple::<String>()
            .one(&self.db)
            .await
            .map_err(|e| ShortenerError::database_operation(format!("Query failed: {}", e)))
    }

    pub(super) async fn find_by_owner(&self, user_id: &str) -> Result<Vec<OwnedUrl>> {
        let models = short_url::Entity::find()
            .filter(short_url::Column::UserId.eq(user_id))
            .filter(short_url::Column::IsDeleted.eq(false))
            .order_by_asc(short_url::Column::CreatedAt)
            .order_by_asc(short_url::Column::ShortCode)
            .all(&self.db)
            .await
            .map_err(|e| ShortenerError::database_operation(format!("Query failed: {}", e)))?;

        Ok(models.into_iter().map(model_to_owned_url).collect())
    }

    pub(super) async fn count_stats(&self) -> Result<StorageStats> {
        let urls = short_url::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ShortenerError::database_operation(format!("Count failed: {}", e)))?;

        let users = short_url::Entity::find()
            .select_only()
            .column(short_url::Column::UserId)
            .distinct()
            .filter(short_url::Column::UserId.ne(""))
            .count(&self.db)
            .await
            .map_err(|e| ShortenerError::database_operation(format!("Count failed: {}", e)))?;

        Ok(StorageStats { urls, users })
    }
}
