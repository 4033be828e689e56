use chrono::Utc;

use crate::storage::{OwnedUrl, UrlRecord};
use migration::entities::short_url;

/// 将 Sea-ORM Model 转换为 UrlRecord
pub fn model_to_record(model: short_url::Model) -> UrlRecord {
    UrlRecord {
        short_code: model.short_code,
        original_url: model.original_url,
        user_id: model.user_id,
        correlation_id: model.correlation_id,
        is_deleted: model.is_deleted,
    }
}

pub fn model_to_owned_url(model: short_url::Model) -> OwnedUrl {
    OwnedUrl {
        short_code: model.short_code,
        original_url: model.original_url,
    }
}

/// 将 UrlRecord 转换为 ActiveModel（仅用于插入）
pub fn record_to_active_model(record: &UrlRecord) -> short_url::ActiveModel {
    use sea_orm::ActiveValue::*;

    short_url::ActiveModel {
        short_code: Set(record.short_code.clone()),
        original_url: Set(record.original_url.clone()),
        user_id: Set(record.user_id.clone()),
        correlation_id: Set(record.correlation_id.clone()),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
    }
}
