//! 点击通知
//!
//! `Notifier` 负责把一次点击投递给链接所有者；`NotificationDispatcher`
//! 把投递放到后台任务执行，重定向响应不会等待它。

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, trace, warn};

use crate::telegram::{BotApi, BotCall, ParseMode, SendMessage};
use crate::token::OwnerId;
use crate::utils::escape_html;

pub const UNKNOWN: &str = "Unknown";

/// 一次点击的元数据，只在通知时使用一次，不持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub url: String,
    pub ip: String,
    pub user_agent: String,
    pub referer: String,
    pub timestamp: DateTime<Utc>,
}

/// 通知投递失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    Transport(String),
    Status(u16),
    Rejected(String),
    Timeout(Duration),
    Serialization(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Transport(msg) => write!(f, "transport error: {}", msg),
            NotifyError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            NotifyError::Rejected(msg) => write!(f, "rejected by Bot API: {}", msg),
            NotifyError::Timeout(d) => write!(f, "timed out after {:?}", d),
            NotifyError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for NotifyError {}

/// 通知投递 trait
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, owner: &OwnerId, click: &ClickEvent) -> Result<(), NotifyError>;

    /// 获取 notifier 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 渲染点击通知（HTML parse_mode）
pub fn format_click_message(click: &ClickEvent) -> String {
    let mut stats = String::new();

    if !click.ip.is_empty() && click.ip != UNKNOWN {
        stats.push_str(&format!("🌐IP: <b>{}</b>\n", escape_html(&click.ip)));
    }
    if !click.user_agent.is_empty() && click.user_agent != UNKNOWN {
        stats.push_str(&format!(
            "📱User-Agent: <b>{}</b>\n",
            escape_html(&click.user_agent)
        ));
    }
    if !click.referer.is_empty() {
        stats.push_str(&format!("🔗Referer: <b>{}</b>\n", escape_html(&click.referer)));
    }
    if stats.is_empty() {
        stats.push_str("🔍No information");
    }

    format!(
        "📩 New Click\n<code>{}</code>\n🕒 {}\n\n{}",
        escape_html(&click.url),
        click.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        stats
    )
}

/// 通过 Bot API sendMessage 投递通知
pub struct TelegramNotifier {
    api: BotApi,
}

impl TelegramNotifier {
    pub fn new(api: BotApi) -> Self {
        Self { api }
    }

    pub fn build_call(owner: &OwnerId, click: &ClickEvent) -> BotCall {
        BotCall::SendMessage(
            SendMessage::new(owner.clone(), format_click_message(click))
                .parse_mode(ParseMode::Html)
                .without_preview(),
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, owner: &OwnerId, click: &ClickEvent) -> Result<(), NotifyError> {
        self.api.call(&Self::build_call(owner, click)).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// 正在执行的后台通知计数
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

/// 任务结束时（包括 panic）递减计数
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// 后台通知调度器
///
/// - 每次 dispatch 恰好一次投递尝试，不重试
/// - Semaphore 限制同时投递数量，单次投递有超时
/// - 失败只记录日志，不影响调用方
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    in_flight: Arc<InFlight>,
    runtime: Option<Handle>,
}

impl NotificationDispatcher {
    /// 在哪个 runtime 里创建，通知任务就跑在哪个 runtime 上
    ///
    /// actix 的 worker 各自有单线程 runtime，停服时会被整个丢弃；
    /// 任务挂在创建者（主 runtime）上才能撑过 `stop(true)` 等到 drain。
    pub fn new(notifier: Arc<dyn Notifier>, max_in_flight: usize, timeout: Duration) -> Self {
        Self {
            notifier,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            timeout,
            in_flight: Arc::new(InFlight::default()),
            runtime: Handle::try_current().ok(),
        }
    }

    /// 当前尚未完成的通知数量（含排队中的）
    pub fn pending(&self) -> usize {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// 派发一次通知，立即返回
    ///
    /// 创建时不在 runtime 内的话，必须在 tokio runtime 内调用。
    pub fn dispatch(&self, owner: OwnerId, click: ClickEvent) {
        self.in_flight.count.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let notifier = Arc::clone(&self.notifier);
        let permits = Arc::clone(&self.permits);
        let timeout = self.timeout;

        let task = async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire_owned().await else {
                warn!("Notification dropped: dispatcher closed");
                return;
            };

            match tokio::time::timeout(timeout, notifier.notify(&owner, &click)).await {
                Ok(Ok(())) => {
                    debug!("Click notification delivered via {} to {}", notifier.name(), owner);
                }
                Ok(Err(e)) => {
                    warn!("Failed to send click notification to {}: {}", owner, e);
                }
                Err(_) => {
                    warn!(
                        "Failed to send click notification to {}: {}",
                        owner,
                        NotifyError::Timeout(timeout)
                    );
                }
            }
        };

        match &self.runtime {
            Some(runtime) => {
                runtime.spawn(task);
            }
            None => {
                tokio::spawn(task);
            }
        }
    }

    /// 等待所有已派发的通知完成，超时返回 false
    pub async fn drain(&self, grace: Duration) -> bool {
        let wait_idle = async {
            loop {
                let notified = self.in_flight.idle.notified();
                if self.pending() == 0 {
                    return;
                }
                trace!("Waiting for {} pending notifications", self.pending());
                notified.await;
            }
        };

        tokio::time::timeout(grace, wait_idle).await.is_ok()
    }
}
