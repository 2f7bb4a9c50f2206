//! CLI interface module
//!
//! Operational commands that run without the HTTP server: webhook
//! registration, minting and inspecting tokens, generating config.

pub mod commands;

use crate::cli::{Commands, ConfigCommands, TokenCommands, WebhookCommands};
use crate::errors::Result;

/// Run a CLI command from clap-parsed input
///
/// `Serve` 不在这里处理，由 main 直接进入 server 模式。
pub async fn run_cli_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Serve => Ok(()),
        Commands::Webhook { action } => match action {
            WebhookCommands::Set {
                url,
                drop_pending_updates,
            } => commands::webhook::set_webhook(url, drop_pending_updates).await,
            WebhookCommands::Delete {
                drop_pending_updates,
            } => commands::webhook::delete_webhook(drop_pending_updates).await,
        },
        Commands::Token { action } => match action {
            TokenCommands::Create {
                url,
                owner,
                ttl,
                domain,
            } => commands::token::create_token(&url, &owner, ttl, domain.as_deref()),
            TokenCommands::Inspect { token } => commands::token::inspect_token(&token),
        },
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                commands::config_gen::config_generate(output_path, force)
            }
        },
    }
}
