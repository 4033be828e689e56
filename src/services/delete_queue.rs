//! Asynchronous batch deletion
//!
//! 删除请求先进入有界队列，处理函数立即返回；后台任务按 FIFO 顺序调用
//! `delete_bulk`，失败只记录日志，不回传给调用方。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, ShortenerError};
use crate::storage::UrlStorage;

/// 一次删除请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTask {
    pub user_id: String,
    pub codes: Vec<String>,
}

/// 队列的发送端，可在各个 worker 之间克隆
#[derive(Clone)]
pub struct DeleteQueue {
    sender: mpsc::Sender<DeleteTask>,
}

impl DeleteQueue {
    /// 只创建通道，不启动消费者
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DeleteTask>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// 创建通道并启动后台消费者
    pub fn start(storage: Arc<dyn UrlStorage>, capacity: usize) -> (Self, DeleteWorker) {
        let (queue, receiver) = Self::new(capacity);
        let worker = DeleteWorker::spawn(storage, receiver);
        (queue, worker)
    }

    /// 非阻塞入队
    ///
    /// 队列已满返回 `QueueFull`，消费者已停止返回 `Internal`。
    pub fn enqueue(&self, user_id: &str, codes: Vec<String>) -> Result<()> {
        let task = DeleteTask {
            user_id: user_id.to_string(),
            codes,
        };
        match self.sender.try_send(task) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(task)) => {
                warn!(
                    "Delete queue full, rejecting {} code(s) from user {}",
                    task.codes.len(),
                    task.user_id
                );
                Err(ShortenerError::queue_full("Delete queue is full"))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(ShortenerError::internal("Delete queue is closed"))
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// 后台消费者句柄
pub struct DeleteWorker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl DeleteWorker {
    pub fn spawn(storage: Arc<dyn UrlStorage>, receiver: mpsc::Receiver<DeleteTask>) -> Self {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_worker(storage, receiver, shutdown_rx));
        Self { shutdown, handle }
    }

    /// 停止接收新任务，等待已入队的任务处理完
    ///
    /// 超时返回 false。
    pub async fn shutdown(self, timeout: Duration) -> bool {
        let _ = self.shutdown.send(());
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("Delete worker panicked: {}", e);
                false
            }
            Err(_) => {
                warn!("Delete worker did not drain within {:?}", timeout);
                false
            }
        }
    }
}

async fn run_worker(
    storage: Arc<dyn UrlStorage>,
    mut receiver: mpsc::Receiver<DeleteTask>,
    mut shutdown: oneshot::Receiver<()>,
) {
    debug!("Delete worker started");
    loop {
        tokio::select! {
            task = receiver.recv() => match task {
                Some(task) => process(storage.as_ref(), task).await,
                None => break,
            },
            _ = &mut shutdown => {
                // 关闭通道后仍可取出已缓冲的任务
                receiver.close();
                while let Some(task) = receiver.recv().await {
                    process(storage.as_ref(), task).await;
                }
                break;
            }
        }
    }
    info!("Delete worker stopped");
}

async fn process(storage: &dyn UrlStorage, task: DeleteTask) {
    match storage.delete_bulk(&task.user_id, &task.codes).await {
        Ok(()) => debug!(
            "Processed delete of {} code(s) for user {}",
            task.codes.len(),
            task.user_id
        ),
        Err(e) => error!(
            "Failed to delete {} code(s) for user {}: {}",
            task.codes.len(),
            task.user_id,
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{OwnedUrl, StorageStats, UrlRecord};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        deletes: Mutex<Vec<DeleteTask>>,
        fail: bool,
    }

    #[async_trait]
    impl UrlStorage for RecordingStorage {
        async fn save(&self, record: &UrlRecord) -> Result<String> {
            Ok(record.short_code.clone())
        }

        async fn load(&self, code: &str) -> Result<String> {
            Err(ShortenerError::not_found(code))
        }

        async fn list_by_owner(&self, _user_id: &str) -> Result<Vec<OwnedUrl>> {
            Ok(Vec::new())
        }

        async fn delete_bulk(&self, user_id: &str, codes: &[String]) -> Result<()> {
            self.deletes.lock().push(DeleteTask {
                user_id: user_id.to_string(),
                codes: codes.to_vec(),
            });
            if self.fail {
                return Err(ShortenerError::database_operation("boom"));
            }
            Ok(())
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }

        async fn stats(&self) -> Result<StorageStats> {
            Ok(StorageStats::default())
        }

        fn backend_name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_tasks_processed_in_order() {
        let storage = Arc::new(RecordingStorage::default());
        let (queue, worker) = DeleteQueue::start(storage.clone(), 8);

        queue.enqueue("u1", vec!["a".into()]).unwrap();
        queue.enqueue("u1", vec!["b".into(), "c".into()]).unwrap();
        assert!(worker.shutdown(Duration::from_secs(5)).await);

        let deletes = storage.deletes.lock();
        assert_eq!(deletes.len(), 2);
        assert_eq!(deletes[0].codes, vec!["a".to_string()]);
        assert_eq!(deletes[1].codes, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let storage = Arc::new(RecordingStorage {
            fail: true,
            ..Default::default()
        });
        let (queue, worker) = DeleteQueue::start(storage.clone(), 8);

        assert!(queue.enqueue("u1", vec!["a".into()]).is_ok());
        assert!(worker.shutdown(Duration::from_secs(5)).await);
        assert_eq!(storage.deletes.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_full_queue_rejects() {
        let (queue, _receiver) = DeleteQueue::new(1);
        queue.enqueue("u1", vec!["a".into()]).unwrap();

        let err = queue.enqueue("u1", vec!["b".into()]).unwrap_err();
        assert!(matches!(err, ShortenerError::QueueFull(_)));
    }

    #[tokio::test]
    async fn test_closed_queue_rejects() {
        let (queue, receiver) = DeleteQueue::new(4);
        drop(receiver);

        let err = queue.enqueue("u1", vec!["a".into()]).unwrap_err();
        assert!(matches!(err, ShortenerError::Internal(_)));
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_fails() {
        let storage = Arc::new(RecordingStorage::default());
        let (queue, worker) = DeleteQueue::start(storage, 4);
        assert!(worker.shutdown(Duration::from_secs(5)).await);

        assert!(queue.enqueue("u1", vec!["a".into()]).is_err());
    }
}
