use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::jwt::JwtService;
use crate::config::AppConfig;
use crate::services::{DeleteQueue, DeleteWorker, UrlService};
use crate::storage::{StorageFactory, UrlStorage};
use crate::utils::ip::is_valid_cidr;

/// 服务启动所需的共享组件
pub struct StartupContext {
    pub storage: Arc<dyn UrlStorage>,
    pub url_service: Arc<UrlService>,
    pub jwt: Arc<JwtService>,
    pub delete_queue: DeleteQueue,
    pub delete_worker: DeleteWorker,
}

/// 准备服务器启动的上下文
/// 包括存储后端、短链服务、会话签名和删除队列
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    crate::system::log_build_info();

    let storage = StorageFactory::create(&config.storage)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    if config.server.trusted_subnet.is_empty() {
        info!("Trusted subnet not configured, internal stats endpoint is disabled");
    } else if !is_valid_cidr(&config.server.trusted_subnet) {
        warn!(
            "Trusted subnet '{}' is not a valid CIDR, internal stats endpoint will reject all requests",
            config.server.trusted_subnet
        );
    }

    let url_service = Arc::new(UrlService::new(
        storage.clone(),
        config.server.base_url.clone(),
    ));
    let jwt = Arc::new(JwtService::from_config(&config.auth));
    let (delete_queue, delete_worker) =
        DeleteQueue::start(storage.clone(), config.delete_queue.capacity.max(1));

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        url_service,
        jwt,
        delete_queue,
        delete_worker,
    })
}
