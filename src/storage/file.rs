use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{OwnedUrl, StorageStats, UrlRecord, UrlStorage};
use crate::errors::{Result, ShortenerError};

/// 文件中的一行记录
#[derive(Debug, Serialize, Deserialize)]
struct FileRecord {
    uuid: u64,
    short_url: String,
    original_url: String,
    #[serde(default)]
    user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

struct FileState {
    writer: File,
    records: HashMap<String, UrlRecord>,
    /// original_url -> short_code
    urls: HashMap<String, String>,
    next_uuid: u64,
}

impl FileState {
    fn insert(&mut self, record: UrlRecord) {
        // 同一短码被新记录替换时，清掉旧 URL 的索引
        if let Some(old) = self.records.get(&record.short_code)
            && old.original_url != record.original_url
        {
            self.urls.remove(&old.original_url);
        }
        self.urls.insert(record.original_url.clone(), record.short_code.clone());
        self.records.insert(record.short_code.clone(), record);
    }
}

/// 追加写的 JSON Lines 文件存储
///
/// 每次保存追加一行并 flush，成功后才更新内存索引。
/// 启动时按顺序重放整个文件，同一短码以最后一行为准。
pub struct FileStorage {
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileStorage {
    /// 打开（不存在则创建）存储文件并重放
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ShortenerError::file_operation(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut state = FileState {
            writer: OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    ShortenerError::file_operation(format!(
                        "Failed to open {}: {}",
                        path.display(),
                        e
                    ))
                })?,
            records: HashMap::new(),
            urls: HashMap::new(),
            next_uuid: 1,
        };

        let replayed = Self::replay(&path, &mut state)?;
        info!(
            "FileStorage loaded {} record(s) ({} line(s)) from {}",
            state.records.len(),
            replayed,
            path.display()
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path, state: &mut FileState) -> Result<usize> {
        let content = fs::read_to_string(path)?;
        let mut count = 0;
        let mut offset = 0u64;
        let mut torn_tail = None;

        for (idx, raw) in content.split_inclusive('\n').enumerate() {
            let start = offset;
            offset += raw.len() as u64;

            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let rec: FileRecord = match serde_json::from_str(line) {
                Ok(rec) => rec,
                // 没有换行结尾的最后一行是写入中断留下的残片
                Err(e) if !raw.ends_with('\n') => {
                    warn!(
                        "{} line {} is truncated, discarding it: {}",
                        path.display(),
                        idx + 1,
                        e
                    );
                    torn_tail = Some(start);
                    break;
                }
                Err(e) => {
                    return Err(ShortenerError::serialization(format!(
                        "{} line {}: {}",
                        path.display(),
                        idx + 1,
                        e
                    )));
                }
            };

            state.next_uuid = state.next_uuid.max(rec.uuid.saturating_add(1));
            state.insert(UrlRecord {
                short_code: rec.short_url,
                original_url: rec.original_url,
                user_id: rec.user_id,
                correlation_id: rec.correlation_id,
                is_deleted: false,
            });
            count += 1;
        }

        if let Some(len) = torn_tail {
            state.writer.set_len(len)?;
        } else if !content.is_empty() && !content.ends_with('\n') {
            // 补上换行，避免下一条记录接在最后一行后面
            state.writer.write_all(b"\n")?;
            state.writer.flush()?;
        }

        Ok(count)
    }
}

#[async_trait]
impl UrlStorage for FileStorage {
    async fn save(&self, record: &UrlRecord) -> Result<String> {
        let mut state = self.state.write();

        if let Some(existing) = state.urls.get(&record.original_url) {
            return Err(ShortenerError::already_exists(existing.clone()));
        }

        let line = FileRecord {
            uuid: state.next_uuid,
            short_url: record.short_code.clone(),
            original_url: record.original_url.clone(),
            user_id: record.user_id.clone(),
            correlation_id: record.correlation_id.clone(),
        };
        let mut data = serde_json::to_vec(&line)?;
        data.push(b'\n');

        let writer = &mut state.writer;
        let previous_len = writer.metadata()?.len();
        if let Err(e) = writer.write_all(&data).and_then(|_| writer.flush()) {
            // 截掉写了一半的行
            if let Err(truncate_err) = writer.set_len(previous_len) {
                error!(
                    "Failed to truncate {} after a failed write: {}",
                    self.path.display(),
                    truncate_err
                );
            }
            return Err(ShortenerError::file_operation(format!(
                "Failed to append to {}: {}",
                self.path.display(),
                e
            )));
        }

        state.next_uuid = state.next_uuid.saturating_add(1);
        state.insert(record.clone());
        debug!("Appended {} to {}", record.short_code, self.path.display());

        Ok(record.short_code.clone())
    }

    async fn load(&self, code: &str) -> Result<String> {
        let state = self.state.read();
        match state.records.get(code) {
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
        let state = self.state.read();
        let mut urls: Vec<OwnedUrl> = state
            .records
            .values()
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
            "File storage does not support deletion, ignoring {} code(s) from user {}",
            codes.len(),
            user_id
        );
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<StorageStats> {
        let state = self.state.read();
        let users: HashSet<&str> = state
            .records
            .values()
            .filter(|r| !r.user_id.is_empty())
            .map(|r| r.user_id.as_str())
            .collect();

        Ok(StorageStats {
            urls: state.records.len() as u64,
            users: users.len() as u64,
        })
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcode;
    use tempfile::TempDir;

    fn record(url: &str, user: &str) -> UrlRecord {
        UrlRecord::new(shortcode::derive(url), url, user)
    }

    fn temp_path(dir: &TempDir) -> PathBuf {
        dir.path().join("urls.json")
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(temp_path(&dir)).unwrap();
        let rec = record("https://example.com/", "u1");

        let code = storage.save(&rec).await.unwrap();
        assert_eq!(storage.load(&code).await.unwrap(), "https://example.com/");
    }

    #[tokio::test]
    async fn test_replay_after_reopen() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        let rec = record("https://example.com/persist", "u1");

        {
            let storage = FileStorage::open(&path).unwrap();
            storage.save(&rec).await.unwrap();
        }

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(
            storage.load(&rec.short_code).await.unwrap(),
            "https://example.com/persist"
        );
        assert_eq!(storage.list_by_owner("u1").await.unwrap().len(), 1);

        // 重放后仍能识别重复
        let err = storage.save(&rec).await.unwrap_err();
        assert!(matches!(err, ShortenerError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_duplicate_does_not_append() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        let storage = FileStorage::open(&path).unwrap();
        let rec = record("https://example.com/", "u1");

        storage.save(&rec).await.unwrap();
        let err = storage.save(&rec).await.unwrap_err();
        assert_eq!(err, ShortenerError::AlreadyExists(rec.short_code.clone()));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_last_record_wins_on_replay() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        fs::write(
            &path,
            concat!(
                r#"{"uuid":1,"short_url":"abc","original_url":"https://old.example/"}"#,
                "\n\n",
                r#"{"uuid":2,"short_url":"abc","original_url":"https://new.example/","user_id":"u9"}"#,
                "\n",
            ),
        )
        .unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.load("abc").await.unwrap(), "https://new.example/");
        assert_eq!(storage.stats().await.unwrap(), StorageStats { urls: 1, users: 1 });

        // 被覆盖的 URL 不再占用唯一索引
        let rec = UrlRecord::new("def", "https://old.example/", "u1");
        assert_eq!(storage.save(&rec).await.unwrap(), "def");

        // 新行的序号接在已有序号之后
        let last = fs::read_to_string(&path).unwrap();
        let last_line = last.lines().last().unwrap();
        assert!(last_line.contains(r#""uuid":3"#));
    }

    #[tokio::test]
    async fn test_malformed_line_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        fs::write(&path, "not json\n").unwrap();

        let err = FileStorage::open(&path).err().unwrap();
        assert!(matches!(err, ShortenerError::Serialization(_)));
        assert!(err.message().contains("line 1"));
    }

    #[tokio::test]
    async fn test_truncated_tail_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        fs::write(
            &path,
            concat!(
                r#"{"uuid":1,"short_url":"abc","original_url":"https://a.example/"}"#,
                "\n",
                r#"{"uuid":2,"short_ur"#,
            ),
        )
        .unwrap();

        {
            let storage = FileStorage::open(&path).unwrap();
            assert_eq!(storage.load("abc").await.unwrap(), "https://a.example/");
            let rec = UrlRecord::new("def", "https://b.example/", "u1");
            storage.save(&rec).await.unwrap();
        }

        // 残片已被截掉，新记录单独成行
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.ends_with('}')));

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.load("def").await.unwrap(), "https://b.example/");
        assert_eq!(storage.stats().await.unwrap().urls, 2);
    }

    #[tokio::test]
    async fn test_missing_final_newline_is_repaired() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        fs::write(
            &path,
            r#"{"uuid":1,"short_url":"abc","original_url":"https://a.example/"}"#,
        )
        .unwrap();

        {
            let storage = FileStorage::open(&path).unwrap();
            let rec = UrlRecord::new("def", "https://b.example/", "u1");
            storage.save(&rec).await.unwrap();
        }

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.load("abc").await.unwrap(), "https://a.example/");
        assert_eq!(storage.load("def").await.unwrap(), "https://b.example/");
    }

    #[tokio::test]
    async fn test_max_uuid_does_not_overflow() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir);
        fs::write(
            &path,
            concat!(
                r#"{"uuid":18446744073709551615,"short_url":"abc","original_url":"https://a.example/"}"#,
                "\n",
            ),
        )
        .unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.load("abc").await.unwrap(), "https://a.example/");
        let rec = UrlRecord::new("def", "https://b.example/", "u1");
        assert_eq!(storage.save(&rec).await.unwrap(), "def");
    }

    #[tokio::test]
    async fn test_creates_missing_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("urls.json");
        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.path().exists());
        assert!(storage.list_by_owner("nobody").await.unwrap().is_empty());
    }
}
