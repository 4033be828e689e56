//! Session middleware
//!
//! 从 Cookie 中读取会话令牌并校验；缺失或无效时签发新身份。
//! 解析结果以 [`Session`] 存入 request extensions，响应中回写 Cookie。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::cookie::Cookie;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Payload, ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error};

use crate::api::jwt::JwtService;

/// 当前请求的用户身份
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    /// 本次请求新签发的身份（请求中没有有效令牌）
    pub fresh: bool,
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Session>()
                .cloned()
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("Session is missing")),
        )
    }
}

/// Session 中间件工厂
#[derive(Clone)]
pub struct SessionMiddleware {
    jwt: Arc<JwtService>,
    cookie_name: Rc<str>,
}

impl SessionMiddleware {
    pub fn new(jwt: Arc<JwtService>, cookie_name: &str) -> Self {
        Self {
            jwt,
            cookie_name: Rc::from(cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
            cookie_name: self.cookie_name.clone(),
        }))
    }
}

pub struct SessionService<S> {
    service: Rc<S>,
    jwt: Arc<JwtService>,
    cookie_name: Rc<str>,
}

impl<S> SessionService<S> {
    /// 返回 (session, 需要回写的 token)
    fn resolve(&self, req: &ServiceRequest) -> Result<(Session, String), Error> {
        if let Some(cookie) = req.cookie(&self.cookie_name) {
            match self.jwt.validate_token(cookie.value()) {
                Ok(claims) => {
                    let session = Session {
                        user_id: claims.sub,
                        fresh: false,
                    };
                    return Ok((session, cookie.value().to_string()));
                }
                Err(e) => debug!("Invalid session token, issuing a new one: {}", e),
            }
        }

        let (user_id, token) = self.jwt.new_identity().map_err(|e| {
            error!("Failed to issue session token: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to issue session token")
        })?;
        debug!("Issued new session for user {}", user_id);
        Ok((
            Session {
                user_id,
                fresh: true,
            },
            token,
        ))
    }
}

impl<S, B> Service<ServiceRequest> for SessionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
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

        let (session, token) = match self.resolve(&req) {
            Ok(resolved) => resolved,
            Err(e) => return Box::pin(async move { Err(e) }),
        };
        req.extensions_mut().insert(session);

        let mut cookie = Cookie::new(self.cookie_name.to_string(), token);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_max_age(actix_web::cookie::time::Duration::minutes(
            self.jwt.token_minutes() as i64,
        ));

        Box::pin(async move {
            let mut response = srv.call(req).await?;
            if let Err(e) = response.response_mut().add_cookie(&cookie) {
                error!("Failed to set session cookie: {}", e);
            }
            Ok(response)
        })
    }
}
