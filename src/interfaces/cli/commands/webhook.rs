//! Webhook registration commands

use colored::Colorize;

use crate::errors::{LinkTrkrError, Result};
use crate::telegram::{BotApi, BotCall, DeleteWebhook, SetWebhook};
use crate::utils::validate_url;

/// 只订阅 BotRouter 会处理的 Update 类型
const ALLOWED_UPDATES: [&str; 3] = ["message", "inline_query", "callback_query"];

pub async fn set_webhook(url: String, drop_pending_updates: bool) -> Result<()> {
    let config = crate::config::get_config();
    if config.bot.token.is_empty() {
        return Err(LinkTrkrError::config("bot.token is required (LT__BOT__TOKEN)"));
    }
    config.bot.validate_webhook_secret()?;

    let parsed = validate_url(&url)
        .map_err(|e| LinkTrkrError::validation(format!("Invalid webhook url: {}", e)))?;
    if parsed.scheme() != "https" {
        return Err(LinkTrkrError::validation("Webhook url must use https"));
    }

    let call = BotCall::SetWebhook(SetWebhook {
        url: parsed.to_string(),
        secret_token: config.bot.webhook_secret.clone(),
        allowed_updates: ALLOWED_UPDATES.iter().map(|s| s.to_string()).collect(),
        drop_pending_updates: drop_pending_updates.then_some(true),
    });
    BotApi::from_config().call(&call).await?;

    println!("{} {}", "Webhook set:".green(), parsed.as_str().blue());
    Ok(())
}

pub async fn delete_webhook(drop_pending_updates: bool) -> Result<()> {
    let config = crate::config::get_config();
    if config.bot.token.is_empty() {
        return Err(LinkTrkrError::config("bot.token is required (LT__BOT__TOKEN)"));
    }

    let call = BotCall::DeleteWebhook(DeleteWebhook {
        drop_pending_updates: drop_pending_updates.then_some(true),
    });
    BotApi::from_config().call(&call).await?;

    println!("{}", "Webhook deleted".green());
    Ok(())
}
