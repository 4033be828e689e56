use std::future::Future;
use std::sync::Arc;

use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};
use tracing::{info, warn};

use super::auth::{self, AUTHORIZATION};
use super::proto;
use super::proto::shortener_service_server::{ShortenerService, ShortenerServiceServer};
use crate::api::jwt::JwtService;
use crate::errors::ShortenerError;
use crate::services::{BatchItem, DeleteQueue, UrlService};
use crate::shortcode;
use crate::utils::ip::is_trusted_client;

pub struct GrpcShortener {
    urls: Arc<UrlService>,
    delete_queue: DeleteQueue,
    jwt: Arc<JwtService>,
    trusted_subnet: String,
    cookie_name: String,
}

impl GrpcShortener {
    pub fn new(
        urls: Arc<UrlService>,
        delete_queue: DeleteQueue,
        jwt: Arc<JwtService>,
        trusted_subnet: impl Into<String>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            urls,
            delete_queue,
            jwt,
            trusted_subnet: trusted_subnet.into(),
            cookie_name: cookie_name.into(),
        }
    }

    fn caller<T>(&self, request: &Request<T>) -> Result<auth::Caller, Status> {
        Ok(auth::caller_or_new(
            &self.jwt,
            request.metadata(),
            &self.cookie_name,
        )?)
    }

    fn require_caller<T>(&self, request: &Request<T>) -> Result<String, Status> {
        Ok(auth::require_caller(
            &self.jwt,
            request.metadata(),
            &self.cookie_name,
        )?)
    }
}

/// 新签发的令牌通过响应元数据回传
fn session_metadata(caller: &auth::Caller, metadata: &mut MetadataMap) {
    if let Some(token) = &caller.issued_token {
        match MetadataValue::try_from(format!("Bearer {}", token)) {
            Ok(value) => {
                metadata.insert(AUTHORIZATION, value);
            }
            Err(e) => warn!("Failed to attach session token: {}", e),
        }
    }
}

fn respond<T>(message: T, caller: &auth::Caller) -> Response<T> {
    let mut response = Response::new(message);
    session_metadata(caller, response.metadata_mut());
    response
}

/// 重复 URL：状态消息为已有短链接，同样带上新签发的令牌
fn already_exists(short_url: String, caller: &auth::Caller) -> Status {
    let mut metadata = MetadataMap::new();
    session_metadata(caller, &mut metadata);
    Status::with_metadata(Code::AlreadyExists, short_url, metadata)
}

#[tonic::async_trait]
impl ShortenerService for GrpcShortener {
    async fn shorten_text(
        &self,
        request: Request<proto::ShortenTextRequest>,
    ) -> Result<Response<proto::ShortenTextResponse>, Status> {
        let caller = self.caller(&request)?;
        let outcome = self
            .urls
            .shorten(&request.get_ref().original_url, &caller.user_id, None)
            .await?;
        if !outcome.is_created() {
            return Err(already_exists(outcome.into_short_url(), &caller));
        }

        Ok(respond(
            proto::ShortenTextResponse {
                short_url: outcome.into_short_url(),
            },
            &caller,
        ))
    }

    async fn shorten_json(
        &self,
        request: Request<proto::ShortenJsonRequest>,
    ) -> Result<Response<proto::ShortenJsonResponse>, Status> {
        let caller = self.caller(&request)?;
        let outcome = self
            .urls
            .shorten(&request.get_ref().url, &caller.user_id, None)
            .await?;
        if !outcome.is_created() {
            return Err(already_exists(outcome.into_short_url(), &caller));
        }

        Ok(respond(
            proto::ShortenJsonResponse {
                result: outcome.into_short_url(),
            },
            &caller,
        ))
    }

    async fn shorten_batch(
        &self,
        request: Request<proto::ShortenBatchRequest>,
    ) -> Result<Response<proto::ShortenBatchResponse>, Status> {
        let caller = self.caller(&request)?;
        let items = request
            .into_inner()
            .items
            .into_iter()
            .map(|item| BatchItem {
                correlation_id: item.correlation_id,
                original_url: item.original_url,
            })
            .collect();

        let results = self.urls.shorten_batch(&caller.user_id, items).await?;

        Ok(respond(
            proto::ShortenBatchResponse {
                items: results
                    .into_iter()
                    .map(|r| proto::BatchResponseItem {
                        correlation_id: r.correlation_id,
                        short_url: r.short_url,
                    })
                    .collect(),
            },
            &caller,
        ))
    }

    async fn get_original(
        &self,
        request: Request<proto::GetOriginalRequest>,
    ) -> Result<Response<proto::GetOriginalResponse>, Status> {
        let code = shortcode::extract_code(&request.get_ref().short_url);
        let original_url = self.urls.resolve(code).await?;
        Ok(Response::new(proto::GetOriginalResponse { original_url }))
    }

    async fn get_user_urls(
        &self,
        request: Request<proto::GetUserUrlsRequest>,
    ) -> Result<Response<proto::GetUserUrlsResponse>, Status> {
        let user_id = self.require_caller(&request)?;
        let urls = self.urls.list_owned(&user_id).await?;

        Ok(Response::new(proto::GetUserUrlsResponse {
            urls: urls
                .into_iter()
                .map(|u| proto::UserUrl {
                    short_url: u.short_url,
                    original_url: u.original_url,
                })
                .collect(),
        }))
    }

    async fn delete_user_urls(
        &self,
        request: Request<proto::DeleteUserUrlsRequest>,
    ) -> Result<Response<proto::DeleteUserUrlsResponse>, Status> {
        let user_id = self.require_caller(&request)?;
        let codes: Vec<String> = request
            .get_ref()
            .short_urls
            .iter()
            .map(|v| shortcode::extract_code(v))
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if codes.is_empty() {
            return Err(ShortenerError::validation("Short URLs are required").into());
        }

        self.delete_queue.enqueue(&user_id, codes)?;
        Ok(Response::new(proto::DeleteUserUrlsResponse {}))
    }

    async fn ping(
        &self,
        _request: Request<proto::PingRequest>,
    ) -> Result<Response<proto::PingResponse>, Status> {
        self.urls.ping().await?;
        Ok(Response::new(proto::PingResponse {}))
    }

    async fn get_stats(
        &self,
        request: Request<proto::GetStatsRequest>,
    ) -> Result<Response<proto::GetStatsResponse>, Status> {
        let real_ip = auth::real_ip(request.metadata());
        if !is_trusted_client(real_ip.as_deref(), &self.trusted_subnet) {
            warn!(
                "Rejected gRPC stats request from {}",
                real_ip.as_deref().unwrap_or("<unknown>")
            );
            return Err(ShortenerError::forbidden("Caller is not in the trusted subnet").into());
        }

        let stats = self.urls.stats().await?;
        Ok(Response::new(proto::GetStatsResponse {
            urls: stats.urls,
            users: stats.users,
        }))
    }
}

/// 启动 gRPC 服务，`shutdown` 完成后停止
pub async fn serve<F>(address: &str, service: GrpcShortener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let addr = tokio::net::lookup_host(address)
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("gRPC address {} did not resolve", address))?;

    info!("Starting gRPC server at {}", addr);
    Server::builder()
        .add_service(ShortenerServiceServer::new(service))
        .serve_with_shutdown(addr, shutdown)
        .await?;
    info!("gRPC server stopped");
    Ok(())
}
