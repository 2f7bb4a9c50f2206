//! Server mode
//!
//! Wires the token codec, Bot API client, notification dispatcher and
//! handlers together, serves until Ctrl+C, then drains pending click
//! notifications before returning.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, middleware::Compress};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::AppState;
use crate::api::services::LandingPage;
use crate::runtime::lifetime;
use crate::services::{
    BotRouter, NotificationDispatcher, Notifier, RedirectResolver, TelegramNotifier,
};
use crate::telegram::BotApi;
use crate::token::TokenCodec;

/// worker 数量上限
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized and the configuration
/// validated before calling this function.
pub async fn run_server() -> Result<()> {
    let config = crate::config::get_config();

    let codec = Arc::new(TokenCodec::from_config());
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(BotApi::from_config()));
    // 在主 runtime 上创建，通知任务不会随 worker runtime 一起被丢弃
    let dispatcher = Arc::new(NotificationDispatcher::new(
        notifier,
        config.notify.max_in_flight,
        Duration::from_secs(config.notify.timeout_secs),
    ));

    let state = AppState::new(
        BotRouter::new(codec.clone(), config.bot.username.clone()),
        RedirectResolver::new(codec.clone(), dispatcher.clone()),
        LandingPage::from_config(codec.clone()),
        &config.bot.webhook_secret,
    );

    if config.token.ttl_secs.is_none() {
        warn!("token.ttl_secs is not set, tracking links never expire");
    }

    let workers = config.server.cpu_count.clamp(1, MAX_WORKERS);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Using {} workers for the server", workers);

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Compress::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(workers)
    .disable_signals()
    .bind(&bind_address)?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();
    tokio::pin!(server);

    // Wait for server or shutdown signal
    tokio::select! {
        res = &mut server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            // 停止接收新连接，等待进行中的请求结束
            handle.stop(true).await;
        }
    }

    lifetime::shutdown::drain_notifications(
        &dispatcher,
        Duration::from_secs(config.notify.shutdown_grace_secs),
    )
    .await;

    info!("Server stopped");
    Ok(())
}
