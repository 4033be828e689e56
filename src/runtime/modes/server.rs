//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It wires storage, services and middleware, then serves until a
//! shutdown signal arrives.

use std::time::Duration;

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::{RequestLogger, SessionMiddleware};
use crate::api::{AppState, configure_routes};
use crate::config::AppConfig;
use crate::runtime::lifetime;
use crate::runtime::lifetime::startup::StartupContext;

/// 请求体上限（解压后）
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Run the HTTP server
///
/// This function:
/// 1. Prepares storage, services and the delete queue
/// 2. Starts the HTTP server (and the gRPC server when configured)
/// 3. On Ctrl+C / SIGTERM stops accepting requests and drains the delete queue
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &'static AppConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let StartupContext {
        url_service,
        jwt,
        delete_queue,
        delete_worker,
        ..
    } = startup;

    let state = AppState::new(
        url_service.clone(),
        delete_queue.clone(),
        config.server.trusted_subnet.clone(),
    );
    let cookie_name = config.auth.cookie_name.clone();
    let session_jwt = jwt.clone();

    let workers = config.server.workers.clamp(1, 32);
    info!("Using {} worker(s) for the HTTP server", workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(session_jwt.clone(), &cookie_name))
            .wrap(Compress::default())
            .wrap(RequestLogger) // 最外层，记录请求耗时
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
            .configure(configure_routes)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(workers)
    .disable_signals()
    .bind(&config.server.address)
    .with_context(|| format!("Failed to bind {}", config.server.address))?
    .run();

    warn!(
        "Starting server at http://{} (base URL {})",
        config.server.address, config.server.base_url
    );

    #[cfg(feature = "grpc")]
    let grpc = if config.grpc.address.is_empty() {
        None
    } else {
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let service = crate::grpc::GrpcShortener::new(
            url_service.clone(),
            delete_queue.clone(),
            jwt.clone(),
            config.server.trusted_subnet.clone(),
            config.auth.cookie_name.clone(),
        );
        let address = config.grpc.address.clone();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = stop_rx.await;
            };
            if let Err(e) = crate::grpc::serve(&address, service, shutdown).await {
                tracing::error!("gRPC server failed: {}", e);
            }
        });
        Some((stop_tx, handle))
    };

    let handle = server.handle();
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::wait_for_signal() => {
            info!("Stopping HTTP server...");
            handle.stop(true).await;
        }
    }

    #[cfg(feature = "grpc")]
    if let Some((stop_tx, handle)) = grpc {
        let _ = stop_tx.send(());
        if let Err(e) = handle.await {
            warn!("gRPC server task failed: {}", e);
        }
    }

    lifetime::shutdown::drain_delete_queue(delete_worker).await;
    warn!("Graceful shutdown: all tasks completed");

    Ok(())
}
