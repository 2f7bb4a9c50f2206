//! Redirect resolver
//!
//! token → 验签解码 → 后台派发点击通知 → 302 到原始 URL。
//! 所有解码失败对外都是同一个 400 "Invalid link"。

use std::sync::Arc;

use actix_web::http::header::{self, HeaderMap};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::notifier::{ClickEvent, NotificationDispatcher, UNKNOWN};
use crate::token::TokenCodec;
use crate::utils::ip::extract_client_ip_from_headers;

pub const INVALID_LINK: &str = "Invalid link";

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    RedirectTo(String),
    Reject { status: u16, message: &'static str },
}

impl RedirectOutcome {
    fn invalid_link() -> Self {
        RedirectOutcome::Reject {
            status: 400,
            message: INVALID_LINK,
        }
    }
}

/// 从入站请求里取出的原始元数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Self {
            client_ip: extract_client_ip_from_headers(headers),
            user_agent: get(header::USER_AGENT.as_str()),
            // 兼容拼写正确的 Referrer
            referer: get(header::REFERER.as_str()).or_else(|| get("referrer")),
        }
    }

    /// 生成 ClickEvent，缺失字段用 "Unknown" / 空串填充
    pub fn to_click(&self, url: &str, timestamp: DateTime<Utc>) -> ClickEvent {
        ClickEvent {
            url: url.to_string(),
            ip: self.client_ip.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            user_agent: self.user_agent.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            referer: self.referer.clone().unwrap_or_default(),
            timestamp,
        }
    }
}

pub struct RedirectResolver {
    codec: Arc<TokenCodec>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl RedirectResolver {
    pub fn new(codec: Arc<TokenCodec>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { codec, dispatcher }
    }

    /// 解析一次点击
    ///
    /// 解码成功时恰好派发一次通知（不等待结果），失败时不派发。
    pub fn resolve(&self, token: &str, meta: &RequestMeta) -> RedirectOutcome {
        let claim = match self.codec.decode(token) {
            Ok(claim) => claim,
            Err(e) => {
                warn!("Rejected tracking token ({}): {}", e.kind(), e);
                return RedirectOutcome::invalid_link();
            }
        };

        let click = meta.to_click(&claim.url, Utc::now());
        debug!("Click on {} for owner {} from {}", claim.url, claim.owner_id, click.ip);
        self.dispatcher.dispatch(claim.owner_id, click);

        RedirectOutcome::RedirectTo(claim.url)
    }
}
