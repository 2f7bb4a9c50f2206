//! Webhook 密钥校验中间件
//!
//! 比较 X-Telegram-Bot-Api-Secret-Token 与配置的密钥，缺失或不一致直接 401，
//! 请求体不会被读取。只拦截 POST（Bot API 投递 Update 的方法），
//! 同一路径上的 GET 落地页不受影响。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use subtle::ConstantTimeEq;
use tracing::{trace, warn};

use crate::api::constants::WEBHOOK_SECRET_HEADER;

/// Webhook 密钥校验中间件
#[derive(Clone)]
pub struct WebhookAuth {
    secret: Arc<str>,
}

impl WebhookAuth {
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for WebhookAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = WebhookAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WebhookAuthMiddleware {
            service: Rc::new(service),
            secret: Arc::clone(&self.secret),
        }))
    }
}

pub struct WebhookAuthMiddleware<S> {
    service: Rc<S>,
    secret: Arc<str>,
}

impl<S> WebhookAuthMiddleware<S> {
    /// 常量时间比较；空密钥永远不匹配
    fn secret_matches(expected: &str, provided: Option<&str>) -> bool {
        match provided {
            Some(provided) if !expected.is_empty() => {
                expected.as_bytes().ct_eq(provided.as_bytes()).into()
            }
            _ => false,
        }
    }
}

impl<S, B> Service<ServiceRequest> for WebhookAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
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
        let secret = self.secret.clone();

        Box::pin(async move {
            if req.method() != Method::POST {
                trace!("Webhook auth skipped: {}", req.method());
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let provided = req
                .headers()
                .get(WEBHOOK_SECRET_HEADER)
                .and_then(|h| h.to_str().ok());

            if !Self::secret_matches(&secret, provided) {
                warn!(
                    "Webhook request rejected: secret token {}",
                    if provided.is_some() { "mismatch" } else { "missing" }
                );
                return Ok(req.into_response(
                    HttpResponse::Unauthorized().finish().map_into_right_body(),
                ));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}
