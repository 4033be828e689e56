//! Request logging middleware
//!
//! 为每个请求生成 UUID 并注入 tracing span，请求结束后记录
//! 方法、路径、状态码、耗时和响应体大小。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::{BodySize, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::api::constants::REQUEST_ID_HEADER;

/// 请求 ID 类型，可从 request extensions 中提取
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Request logging 中间件工厂
#[derive(Clone, Default)]
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let start = Instant::now();

        let request_id = Uuid::new_v4().to_string();
        req.extensions_mut().insert(RequestId(request_id.clone()));

        let method = req.method().to_string();
        let uri = req.uri().to_string();

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %req.path(),
        );

        Box::pin(
            async move {
                let mut response = match srv.call(req).await {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(
                            uri = %uri,
                            method = %method,
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Request failed: {}",
                            e
                        );
                        return Err(e);
                    }
                };

                let size = match response.response().body().size() {
                    BodySize::Sized(n) => n,
                    _ => 0,
                };
                info!(
                    uri = %uri,
                    method = %method,
                    status = response.status().as_u16(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    size = size,
                    "Request handled"
                );

                // 在响应头中添加 X-Request-ID，方便调试
                if let Ok(header_value) = HeaderValue::from_str(&request_id) {
                    response
                        .headers_mut()
                        .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
