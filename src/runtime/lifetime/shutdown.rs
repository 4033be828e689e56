use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use crate::services::DeleteWorker;

/// 关闭超时时间（秒）
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C 或 SIGTERM
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// 等待删除队列中已接收的任务执行完
pub async fn drain_delete_queue(worker: DeleteWorker) {
    let timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
    if worker.shutdown(timeout).await {
        info!("Delete queue drained");
    } else {
        error!(
            "Delete queue not drained within {} seconds, pending deletions are lost",
            SHUTDOWN_TIMEOUT_SECS
        );
    }
}
