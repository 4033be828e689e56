use serde::{Deserialize, Serialize};

/// 一条短链接记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub short_code: String,
    pub original_url: String,
    /// 所属用户，匿名创建时为空字符串
    #[serde(default)]
    pub user_id: String,
    /// 仅批量创建时携带
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl UrlRecord {
    pub fn new(
        short_code: impl Into<String>,
        original_url: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            user_id: user_id.into(),
            correlation_id: None,
            is_deleted: false,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// 用户名下的一条链接（短码尚未展开）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedUrl {
    pub short_code: String,
    pub original_url: String,
}

/// 统计快照，按需计算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub urls: u64,
    pub users: u64,
}
