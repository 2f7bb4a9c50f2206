use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use crate::services::NotificationDispatcher;

/// 等待 Ctrl+C；监听失败时也按收到信号处理
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 等待后台通知发完，最多 `grace`
///
/// 返回 true 表示全部完成。
pub async fn drain_notifications(dispatcher: &NotificationDispatcher, grace: Duration) -> bool {
    let pending = dispatcher.pending();
    if pending == 0 {
        info!("No pending click notifications");
        return true;
    }

    info!(
        "Waiting up to {}s for {} pending click notifications",
        grace.as_secs(),
        pending
    );
    if dispatcher.drain(grace).await {
        info!("All click notifications finished");
        true
    } else {
        error!(
            "Shutdown grace period elapsed with {} click notifications still pending",
            dispatcher.pending()
        );
        false
    }
}
