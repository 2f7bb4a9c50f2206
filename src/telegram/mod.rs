//! Telegram Bot API surface: webhook update types, outbound calls and the
//! HTTP client that performs them.

pub mod client;
pub mod types;

pub use client::BotApi;
pub use types::*;
