//! URL shortening service
//!
//! Business logic shared between the HTTP and gRPC surfaces.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::{Result, ShortenerError};
use crate::shortcode;
use crate::storage::{StorageStats, UrlRecord, UrlStorage};

// ============ Request/Response DTOs ============

/// Result of a single shorten request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenOutcome {
    /// 新建的短链接
    Created(String),
    /// 原始 URL 已存在，返回已有短链接
    Existing(String),
}

impl ShortenOutcome {
    pub fn short_url(&self) -> &str {
        match self {
            ShortenOutcome::Created(url) | ShortenOutcome::Existing(url) => url,
        }
    }

    pub fn into_short_url(self) -> String {
        match self {
            ShortenOutcome::Created(url) | ShortenOutcome::Existing(url) => url,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, ShortenOutcome::Created(_))
    }
}

/// Batch request item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(default)]
    pub correlation_id: String,
    #[serde(default)]
    pub original_url: String,
}

/// Batch response item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub correlation_id: String,
    pub short_url: String,
}

/// A user's link with the short code expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

pub struct UrlService {
    storage: Arc<dyn UrlStorage>,
    base_url: String,
}

impl UrlService {
    pub fn new(storage: Arc<dyn UrlStorage>, base_url: impl Into<String>) -> Self {
        Self {
            storage,
            base_url: base_url.into(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn UrlStorage> {
        &self.storage
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn short_url(&self, code: &str) -> String {
        shortcode::expand(&self.base_url, code)
    }

    /// 为原始 URL 生成短链接
    pub async fn shorten(
        &self,
        original_url: &str,
        user_id: &str,
        correlation_id: Option<String>,
    ) -> Result<ShortenOutcome> {
        let original_url = original_url.trim();
        if original_url.is_empty() {
            return Err(ShortenerError::validation("URL must not be empty"));
        }

        let code = shortcode::derive(original_url);
        let record =
            UrlRecord::new(code, original_url, user_id).with_correlation_id(correlation_id);

        match self.storage.save(&record).await {
            Ok(code) => {
                debug!("Shortened {} -> {}", original_url, code);
                Ok(ShortenOutcome::Created(self.short_url(&code)))
            }
            Err(ShortenerError::AlreadyExists(code)) => {
                Ok(ShortenOutcome::Existing(self.short_url(&code)))
            }
            Err(e) => {
                error!("Failed to save {}: {}", original_url, e);
                Err(e)
            }
        }
    }

    /// 批量生成短链接
    ///
    /// 各项独立保存，结果按输入顺序返回。已存在的 URL 返回已有短链接；
    /// 存储错误会中止剩余项，已保存的不回滚。
    pub async fn shorten_batch(
        &self,
        user_id: &str,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>> {
        if items.is_empty() {
            return Err(ShortenerError::validation("Batch must not be empty"));
        }
        if let Some(pos) = items.iter().position(|i| i.original_url.trim().is_empty()) {
            return Err(ShortenerError::validation(format!(
                "Batch item {} has an empty original_url",
                pos
            )));
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let correlation_id = (!item.correlation_id.is_empty())
                .then(|| item.correlation_id.clone());
            let outcome = self
                .shorten(&item.original_url, user_id, correlation_id)
                .await?;
            results.push(BatchResult {
                correlation_id: item.correlation_id,
                short_url: outcome.into_short_url(),
            });
        }

        Ok(results)
    }

    /// 按短码查询原始 URL
    pub async fn resolve(&self, code: &str) -> Result<String> {
        if code.is_empty() {
            return Err(ShortenerError::validation("Short code is missing"));
        }
        if !shortcode::is_valid_short_code(code) {
            return Err(ShortenerError::not_found(format!(
                "Short URL not found: {}",
                code
            )));
        }
        self.storage.load(code).await
    }

    /// 用户名下的链接（短码展开为完整短链接）
    pub async fn list_owned(&self, user_id: &str) -> Result<Vec<UserUrl>> {
        let owned = self.storage.list_by_owner(user_id).await?;
        Ok(owned
            .into_iter()
            .map(|u| UserUrl {
                short_url: self.short_url(&u.short_code),
                original_url: u.original_url,
            })
            .collect())
    }

    pub async fn stats(&self) -> Result<StorageStats> {
        self.storage.stats().await
    }

    pub async fn ping(&self) -> Result<()> {
        self.storage.ping().await
    }
}
