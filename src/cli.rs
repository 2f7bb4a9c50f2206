//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// linktrkr - Telegram link tracker bot
#[derive(Parser, Debug)]
#[command(name = "linktrkr")]
#[command(version)]
#[command(about = "Telegram bot that wraps URLs in signed tracking links", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve,

    /// Manage the bot webhook registration
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },

    /// Create or inspect tracking tokens
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommands {
    /// Register the webhook URL together with the configured secret token
    Set {
        /// Public HTTPS URL of this service (e.g. https://trk.example/)
        #[arg(long)]
        url: String,

        /// Drop updates queued while no webhook was set
        #[arg(long)]
        drop_pending_updates: bool,
    },

    /// Remove the webhook
    Delete {
        /// Drop queued updates
        #[arg(long)]
        drop_pending_updates: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// Sign a tracking token for URL
    Create {
        /// Destination URL (http/https)
        url: String,

        /// Chat id (or @username) that receives click notifications
        #[arg(long, allow_hyphen_values = true)]
        owner: String,

        /// Lifetime in seconds (default: token.ttl_secs)
        #[arg(long)]
        ttl: Option<u64>,

        /// Print a full tracking link for this domain
        #[arg(long)]
        domain: Option<String>,
    },

    /// Verify a token and print its claim
    Inspect {
        token: String,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
