use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use super::{OwnedUrl, StorageStats, UrlRecord, UrlStorage};
use crate::errors::{Result, ShortenerError};

/// 内存存储
///
/// `records` 以短码为键，`urls` 维护原始 URL 到短码的唯一索引。
/// 写入时先占住 `urls` 的条目再写 `records`，两个 map 的加锁顺序固定。
#[derive(Default)]
pub struct MemoryStorage {
    records: DashMap<String, UrlRecord>,
    urls: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl UrlStorage for MemoryStorage {
    async fn save(&self, record: &UrlRecord) -> Result<String> {
        match self.urls.entry(record.original_url.clone()) {
            Entry::Occupied(existing) => Err(ShortenerError::already_exists(existing.get().clone())),
            Entry::Vacant(slot) => {
                self.records.insert(record.short_code.clone(), record.clone());
                slot.insert(record.short_code.clone());
                debug!("Saved {} -> {}", record.short_code, record.original_url);
                Ok(record.short_code.clone())
            }
        }
    }

    async fn load(&self, code: &str) -> Result<String> {
        match self.records.get(code) {
            Some(record) if record.is_deleted => {
                Err(ShortenerError::deleted(format!("Short URL deleted: {}", code)))
            }
            Some(record) => Ok(record.original_url.clone()),
            None => Err(ShortenerError::not_found(format!(
                "Short URL not found: {}",
                code
            ))),
        }
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<OwnedUrl>> {
        let mut urls: Vec<OwnedUrl> = self
            .records
            .iter()
            .filter(|r| !r.is_deleted && r.user_id == user_id)
            .map(|r| OwnedUrl {
                short_code: r.short_code.clone(),
                original_url: r.original_url.clone(),
            })
            .collect();
        urls.sort_by(|a, b| a.short_code.cmp(&b.short_code));
        Ok(urls)
    }

    async fn delete_bulk(&self, user_id: &str, codes: &[String]) -> Result<()> {
        warn!(
            "Memory storage does not support deletion, ignoring {} code(s) from user {}",
            codes.len(),
            user_id
        );
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<StorageStats> {
        let users: HashSet<String> = self
            .records
            .iter()
            .filter(|r| !r.user_id.is_empty())
            .map(|r| r.user_id.clone())
            .collect();

        Ok(StorageStats {
            urls: self.records.len() as u64,
            users: users.len() as u64,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
