//! Bot API HTTP 客户端
//!
//! ureq 是同步客户端，所有请求都放到 spawn_blocking 里执行，
//! 全局超时由 Agent 配置保证。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};
use ureq::Agent;

use super::types::{ApiResponse, BotCall};
use crate::services::notifier::NotifyError;

/// Telegram Bot API 客户端
#[derive(Clone)]
pub struct BotApi {
    agent: Agent,
    base_url: Arc<str>,
}

impl BotApi {
    /// `api_base_url` 一般是 `https://api.telegram.org`
    pub fn new(api_base_url: &str, bot_token: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: Arc::from(format!(
                "{}/bot{}",
                api_base_url.trim_end_matches('/'),
                bot_token
            )),
        }
    }

    /// Create BotApi from config
    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self::new(
            &config.bot.api_base_url,
            &config.bot.token,
            Duration::from_secs(config.notify.timeout_secs),
        )
    }

    /// 方法对应的完整 URL（含 bot token，不要写进日志）
    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// 同步执行一次调用（在 spawn_blocking 中调用）
    fn call_sync(
        agent: Agent,
        url: String,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, NotifyError> {
        let resp = agent
            .post(&url)
            .send_json(&params)
            .map_err(|e| NotifyError::Transport(format!("{}: {}", method, e)))?;

        let status = resp.status().as_u16();
        let body: ApiResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| match status {
                200..=299 => NotifyError::Serialization(format!("{}: {}", method, e)),
                _ => NotifyError::Status(status),
            })?;

        if !body.ok {
            return Err(NotifyError::Rejected(
                body.description
                    .unwrap_or_else(|| format!("{} returned ok=false (HTTP {})", method, status)),
            ));
        }

        trace!("Bot API {} succeeded", method);
        Ok(body.result.unwrap_or(serde_json::Value::Null))
    }

    /// 执行一次 Bot API 调用
    pub async fn call(&self, call: &BotCall) -> Result<serde_json::Value, NotifyError> {
        let method = call.method_name();
        let params = call
            .parameters()
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;
        let url = self.method_url(method);
        let agent = self.agent.clone();

        debug!("Calling Bot API method {}", method);
        tokio::task::spawn_blocking(move || Self::call_sync(agent, url, method, params))
            .await
            .map_err(|e| NotifyError::Transport(format!("{}: blocking task failed: {}", method, e)))?
    }
}
