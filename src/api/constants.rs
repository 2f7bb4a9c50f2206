//! API 模块常量定义

/// Webhook 共享密钥请求头（setWebhook 的 secret_token）
pub const WEBHOOK_SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Webhook 请求体上限
pub const WEBHOOK_PAYLOAD_LIMIT: usize = 1024 * 1024;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
