//! HTTP surface
//!
//! - `POST /`: webhook（WebhookAuth 校验密钥）
//! - `GET /`: 落地页
//! - `GET /r/{token}`: 跟踪链接跳转
//! - 其余路径 404

pub mod constants;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use actix_web::web;

use crate::services::{BotRouter, RedirectResolver};
use services::LandingPage;

/// 所有 worker 共享的请求处理状态
#[derive(Clone)]
pub struct AppState {
    pub router: web::Data<BotRouter>,
    pub resolver: web::Data<RedirectResolver>,
    pub landing: web::Data<LandingPage>,
    pub webhook_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        router: BotRouter,
        resolver: RedirectResolver,
        landing: LandingPage,
        webhook_secret: impl AsRef<str>,
    ) -> Self {
        Self {
            router: web::Data::new(router),
            resolver: web::Data::new(resolver),
            landing: web::Data::new(landing),
            webhook_secret: Arc::from(webhook_secret.as_ref()),
        }
    }

    /// 注册路由和共享数据，供 `App::configure` 使用
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.router.clone())
            .app_data(self.resolver.clone())
            .app_data(self.landing.clone())
            .app_data(web::PayloadConfig::new(constants::WEBHOOK_PAYLOAD_LIMIT))
            .service(services::root_routes(&self.webhook_secret))
            .service(services::redirect_routes())
            .default_service(web::to(services::not_found));
    }
}
