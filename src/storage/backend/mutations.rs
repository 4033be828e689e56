//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, SqlErr, TransactionTrait};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::record_to_active_model;
use crate::errors::{Result, ShortenerError};
use crate::storage::UrlRecord;

use migration::entities::short_url;

impl SeaOrmStorage {
    /// 插入一条记录，original_url 冲突时返回已有短码
    pub(super) async fn insert_record(&self, record: &UrlRecord) -> Result<String> {
        let result = short_url::Entity::insert(record_to_active_model(record))
            .on_conflict(
                OnConflict::column(short_url::Column::OriginalUrl)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(rows) if rows > 0 => {
                debug!("Inserted {} -> {}", record.short_code, record.original_url);
                Ok(record.short_code.clone())
            }
            Ok(_) => Err(self.conflict_error(record).await),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(self.conflict_error(record).await)
            }
            Err(e) => Err(ShortenerError::database_operation(format!(
                "Insert failed: {}",
                e
            ))),
        }
    }

    async fn conflict_error(&self, record: &UrlRecord) -> ShortenerError {
        match self.find_code_by_url(&record.original_url).await {
            Ok(Some(code)) => ShortenerError::already_exists(code),
            // 主键冲突但 URL 不同：短码碰撞
            Ok(None) => ShortenerError::database_operation(format!(
                "Short code collision: {}",
                record.short_code
            )),
            Err(e) => e,
        }
    }

    /// 在一个事务内软删除用户名下的短码，任一失败整体回滚
    pub(super) async fn mark_deleted(&self, user_id: &str, codes: &[String]) -> Result<()> {
        if codes.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await.map_err(|e| {
            ShortenerError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        let mut affected = 0u64;
        for code in codes {
            let result = short_url::Entity::update_many()
                .col_expr(short_url::Column::IsDeleted, Expr::value(true))
                .filter(short_url::Column::ShortCode.eq(code.as_str()))
                .filter(short_url::Column::UserId.eq(user_id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    ShortenerError::database_operation(format!(
                        "Failed to delete {}: {}",
                        code, e
                    ))
                })?;
            affected += result.rows_affected;
        }

        txn.commit().await.map_err(|e| {
            ShortenerError::database_operation(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Marked {} of {} code(s) deleted for user {}",
            affected,
            codes.len(),
            user_id
        );
        Ok(())
    }
}
