//! Bot command router
//!
//! 每个 Update 独立处理、没有会话状态。所有分支都是全函数：
//! 校验或签发失败都会映射成面向用户的回复，不会向上抛错。

use std::sync::Arc;

use tracing::{debug, error};

use super::messages;
use super::tracking_link::build_link;
use crate::telegram::{
    AnswerCallbackQuery, AnswerInlineQuery, BotCall, CallbackQuery, InlineKeyboardButton,
    InlineKeyboardMarkup, InlineQuery, InlineQueryResult, InlineQueryResultArticle,
    InputTextMessageContent, Message, ParseMode, SendMessage, Update, WebhookReply,
};
use crate::token::{EncodeError, OwnerId, TokenCodec, TrackingClaim};
use crate::utils::{escape_html, is_valid_url};

const START_COMMAND: &str = "/start";

pub struct BotRouter {
    codec: Arc<TokenCodec>,
    bot_username: String,
}

impl BotRouter {
    pub fn new(codec: Arc<TokenCodec>, bot_username: impl Into<String>) -> Self {
        Self {
            codec,
            bot_username: bot_username.into(),
        }
    }

    /// 按 Update 的形状分发
    pub fn route(&self, update: &Update, domain: &str) -> WebhookReply {
        if let Some(message) = &update.message {
            return self.handle_message(message, domain);
        }
        if let Some(query) = &update.inline_query {
            return self.handle_inline_query(query, domain).into();
        }
        if let Some(callback) = &update.callback_query {
            return Self::handle_callback_query(callback).into();
        }

        debug!("Unhandled update {}, acknowledging", update.update_id);
        WebhookReply::ack()
    }

    fn issue_link(&self, url: &str, owner: OwnerId, domain: &str) -> Result<String, EncodeError> {
        let token = self.codec.issue(&TrackingClaim::new(url, owner))?;
        Ok(build_link(domain, &token))
    }

    fn handle_message(&self, message: &Message, domain: &str) -> WebhookReply {
        let Some(text) = message.text.as_deref() else {
            return WebhookReply::ack();
        };
        let text = text.trim();
        let chat_id = message.chat.id;

        let reply = if text.starts_with(START_COMMAND) {
            SendMessage::new(chat_id, messages::welcome(&self.bot_username))
        } else if !is_valid_url(text) {
            SendMessage::new(chat_id, messages::INVALID_URL)
        } else {
            match self.issue_link(text, OwnerId::Id(chat_id), domain) {
                Ok(tracking_url) => {
                    SendMessage::new(chat_id, messages::tracking_url_success(&tracking_url))
                        .parse_mode(ParseMode::MarkdownV2)
                        .without_preview()
                }
                Err(e) => {
                    error!("Failed to create tracking link for chat {}: {}", chat_id, e);
                    SendMessage::new(chat_id, messages::ERROR_CREATING_LINK)
                }
            }
        };

        BotCall::SendMessage(reply.reply_to(message.message_id)).into()
    }

    fn handle_inline_query(&self, query: &InlineQuery, domain: &str) -> BotCall {
        let text = query.query.trim();

        let result = if !is_valid_url(text) {
            InlineQueryResultArticle {
                id: "invalid".to_string(),
                title: messages::INLINE_INVALID_TITLE.to_string(),
                description: messages::INLINE_INVALID_DESC.to_string(),
                input_message_content: InputTextMessageContent {
                    message_text: messages::INLINE_INVALID_TEXT.to_string(),
                    parse_mode: None,
                },
                reply_markup: Some(InlineKeyboardMarkup {
                    inline_keyboard: vec![vec![InlineKeyboardButton {
                        text: messages::INLINE_EXAMPLE_BUTTON.to_string(),
                        switch_inline_query: Some(messages::INLINE_EXAMPLE_URL.to_string()),
                    }]],
                }),
            }
        } else {
            match self.issue_link(text, OwnerId::Id(query.from.id), domain) {
                Ok(tracking_url) => InlineQueryResultArticle {
                    id: "valid".to_string(),
                    title: messages::INLINE_VALID_TITLE.to_string(),
                    description: messages::INLINE_VALID_DESC.to_string(),
                    input_message_content: InputTextMessageContent {
                        message_text: format!(
                            "<a href=\"{}\">{}</a>",
                            escape_html(&tracking_url),
                            escape_html(text)
                        ),
                        parse_mode: Some(ParseMode::Html),
                    },
                    reply_markup: None,
                },
                Err(e) => {
                    error!(
                        "Failed to create inline tracking link for user {}: {}",
                        query.from.id, e
                    );
                    InlineQueryResultArticle {
                        id: "error".to_string(),
                        title: messages::INLINE_ERROR_TITLE.to_string(),
                        description: messages::INLINE_ERROR_DESC.to_string(),
                        input_message_content: InputTextMessageContent {
                            message_text: messages::ERROR_CREATING_LINK.to_string(),
                            parse_mode: None,
                        },
                        reply_markup: None,
                    }
                }
            }
        };

        // 结果里嵌着提问者的身份，不能被 Telegram 跨用户缓存
        BotCall::AnswerInlineQuery(AnswerInlineQuery {
            inline_query_id: query.id.clone(),
            results: vec![InlineQueryResult::Article(result)],
            cache_time: Some(0),
            is_personal: Some(true),
        })
    }

    fn handle_callback_query(callback: &CallbackQuery) -> BotCall {
        BotCall::AnswerCallbackQuery(AnswerCallbackQuery {
            callback_query_id: callback.id.clone(),
        })
    }
}
