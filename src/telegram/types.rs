//! Telegram Bot API 数据结构
//!
//! 只声明本服务用到的字段，其余字段反序列化时忽略。

use serde::{Deserialize, Serialize};

use crate::token::OwnerId;

// ============================================================
// Inbound (webhook update)
// ============================================================

/// Webhook 推送的 Update 信封；`update_id` 必须存在
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub inline_query: Option<InlineQuery>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
}

// ============================================================
// Outbound (webhook reply / Bot API call)
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    MarkdownV2,
}

/// 一次 Bot API 调用：方法名 + 参数
///
/// 既可以直接作为 webhook 响应体返回（`{"method": ..., ...}`），
/// 也可以通过 [`BotApi`](super::client::BotApi) 主动发送。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum BotCall {
    SendMessage(SendMessage),
    AnswerInlineQuery(AnswerInlineQuery),
    AnswerCallbackQuery(AnswerCallbackQuery),
    SetWebhook(SetWebhook),
    DeleteWebhook(DeleteWebhook),
}

impl BotCall {
    pub fn method_name(&self) -> &'static str {
        match self {
            BotCall::SendMessage(_) => "sendMessage",
            BotCall::AnswerInlineQuery(_) => "answerInlineQuery",
            BotCall::AnswerCallbackQuery(_) => "answerCallbackQuery",
            BotCall::SetWebhook(_) => "setWebhook",
            BotCall::DeleteWebhook(_) => "deleteWebhook",
        }
    }

    /// 不含 `method` 字段的参数对象，用于 POST /bot{token}/{method}
    pub fn parameters(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("method");
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub chat_id: OwnerId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl SendMessage {
    pub fn new(chat_id: impl Into<OwnerId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            disable_web_page_preview: None,
            reply_to_message_id: None,
        }
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_web_page_preview = Some(true);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerInlineQuery {
    pub inline_query_id: String,
    pub results: Vec<InlineQueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_personal: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InlineQueryResult {
    Article(InlineQueryResultArticle),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineQueryResultArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub input_message_content: InputTextMessageContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputTextMessageContent {
    pub message_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetWebhook {
    pub url: String,
    pub secret_token: String,
    pub allowed_updates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_pending_updates: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteWebhook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_pending_updates: Option<bool>,
}

/// Webhook 的响应体：要么是一次 Bot API 调用，要么是空确认 `{"ok":true,"result":{}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WebhookReply {
    Call(BotCall),
    Ack(Ack),
}

impl WebhookReply {
    pub fn ack() -> Self {
        WebhookReply::Ack(Ack::default())
    }

    pub fn as_call(&self) -> Option<&BotCall> {
        match self {
            WebhookReply::Call(call) => Some(call),
            WebhookReply::Ack(_) => None,
        }
    }
}

impl From<BotCall> for WebhookReply {
    fn from(call: BotCall) -> Self {
        WebhookReply::Call(call)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ack {
    pub ok: bool,
    pub result: serde_json::Map<String, serde_json::Value>,
}

impl Default for Ack {
    fn default() -> Self {
        Self {
            ok: true,
            result: serde_json::Map::new(),
        }
    }
}

/// Bot API 的统一响应包装
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}
