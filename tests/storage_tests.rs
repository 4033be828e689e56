//! SeaORM 存储集成测试（SQLite 临时文件）

use std::sync::Arc;

use sea_orm::ConnectionTrait;
use shortener::errors::ShortenerError;
use shortener::shortcode;
use shortener::storage::{SeaOrmStorage, StorageStats, UrlRecord, UrlStorage};
use tempfile::TempDir;

async fn sqlite_storage(dir: &TempDir) -> SeaOrmStorage {
    let db_path = dir.path().join("shortener_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    SeaOrmStorage::new(&db_url, "sqlite", 1)
        .await
        .expect("创建 SQLite 存储失败")
}

fn record(url: &str, user: &str) -> UrlRecord {
    UrlRecord::new(shortcode::derive(url), url, user)
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    let rec = record("https://example.com/db", "u1").with_correlation_id(Some("c-1".into()));

    let code = storage.save(&rec).await.unwrap();
    assert_eq!(code, rec.short_code);
    assert_eq!(storage.load(&code).await.unwrap(), "https://example.com/db");
    assert_eq!(storage.backend_name(), "database");
    assert_eq!(storage.backend_type(), "sqlite");
}

#[tokio::test]
async fn test_conflict_returns_existing_code() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    let rec = record("https://example.com/dup", "u1");
    storage.save(&rec).await.unwrap();

    let err = storage
        .save(&record("https://example.com/dup", "u2"))
        .await
        .unwrap_err();
    assert_eq!(err, ShortenerError::AlreadyExists(rec.short_code.clone()));

    // 原归属不变
    assert_eq!(storage.list_by_owner("u1").await.unwrap().len(), 1);
    assert!(storage.list_by_owner("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_unknown_code() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    let err = storage.load("doesNotExist").await.unwrap_err();
    assert!(matches!(err, ShortenerError::NotFound(_)));
}

#[tokio::test]
async fn test_soft_delete_marks_gone_and_hides_from_list() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    let a = record("https://a.example/", "u1");
    let b = record("https://b.example/", "u1");
    storage.save(&a).await.unwrap();
    storage.save(&b).await.unwrap();

    storage
        .delete_bulk("u1", &[a.short_code.clone()])
        .await
        .unwrap();

    let err = storage.load(&a.short_code).await.unwrap_err();
    assert!(matches!(err, ShortenerError::Deleted(_)));
    assert_eq!(
        storage.load(&b.short_code).await.unwrap(),
        "https://b.example/"
    );

    let owned = storage.list_by_owner("u1").await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].short_code, b.short_code);

    // 软删除后原始 URL 仍占用唯一约束
    let err = storage.save(&a).await.unwrap_err();
    assert_eq!(err, ShortenerError::AlreadyExists(a.short_code.clone()));
}

#[tokio::test]
async fn test_delete_ignores_codes_of_other_users() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    let mine = record("https://mine.example/", "u1");
    let theirs = record("https://theirs.example/", "u2");
    storage.save(&mine).await.unwrap();
    storage.save(&theirs).await.unwrap();

    storage
        .delete_bulk(
            "u1",
            &[
                mine.short_code.clone(),
                theirs.short_code.clone(),
                "unknownCode".to_string(),
            ],
        )
        .await
        .unwrap();

    assert!(matches!(
        storage.load(&mine.short_code).await,
        Err(ShortenerError::Deleted(_))
    ));
    assert_eq!(
        storage.load(&theirs.short_code).await.unwrap(),
        "https://theirs.example/"
    );
}

#[tokio::test]
async fn test_failed_delete_rolls_back_whole_batch() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    let ok = UrlRecord::new("okCode1", "https://a.example/", "u1");
    let boom = UrlRecord::new("boomCode", "https://b.example/", "u1");
    storage.save(&ok).await.unwrap();
    storage.save(&boom).await.unwrap();

    // 让第二条更新在事务中途失败
    storage
        .get_db()
        .execute_unprepared(
            "CREATE TRIGGER fail_boom BEFORE UPDATE ON short_urls \
             WHEN NEW.short_code = 'boomCode' \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
        )
        .await
        .unwrap();

    let err = storage
        .delete_bulk("u1", &[ok.short_code.clone(), boom.short_code.clone()])
        .await
        .unwrap_err();
    assert!(matches!(err, ShortenerError::DatabaseOperation(_)));

    // 第一条的软删除随事务一起回滚
    assert_eq!(
        storage.load(&ok.short_code).await.unwrap(),
        "https://a.example/"
    );
    assert_eq!(storage.list_by_owner("u1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_stats_and_ping() {
    let dir = TempDir::new().unwrap();
    let storage = sqlite_storage(&dir).await;
    storage.ping().await.unwrap();

    storage.save(&record("https://a.example/", "u1")).await.unwrap();
    storage.save(&record("https://b.example/", "u1")).await.unwrap();
    storage.save(&record("https://c.example/", "u2")).await.unwrap();

    assert_eq!(
        storage.stats().await.unwrap(),
        StorageStats { urls: 3, users: 2 }
    );
}

#[tokio::test]
async fn test_data_survives_reconnect() {
    let dir = TempDir::new().unwrap();
    let rec = record("https://persist.example/", "u1");
    {
        let storage = sqlite_storage(&dir).await;
        storage.save(&rec).await.unwrap();
    }

    let storage = sqlite_storage(&dir).await;
    assert_eq!(
        storage.load(&rec.short_code).await.unwrap(),
        "https://persist.example/"
    );
}

#[tokio::test]
async fn test_concurrent_saves_of_same_url() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(sqlite_storage(&dir).await);

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage
                .save(&record("https://race.example/", &format!("u{}", i)))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(ShortenerError::AlreadyExists(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(storage.stats().await.unwrap().urls, 1);
}
