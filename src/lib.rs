//! linktrkr - Telegram link tracker bot
//!
//! Users send a URL to the bot and get back a tracking link whose token is a
//! signed claim (destination + owner chat). Opening the link redirects to the
//! destination and sends the owner a click notification in the background.
//! Nothing is stored: the token is the only state.
//!
//! # Architecture
//! - `token`: signed claim codec
//! - `telegram`: Bot API types and HTTP client
//! - `services`: bot router, redirect resolver, notification dispatcher
//! - `api`: HTTP handlers and middleware
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and panic handling

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod system;
pub mod telegram;
pub mod token;
pub mod utils;
