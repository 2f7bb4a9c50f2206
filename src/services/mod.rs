//! Service layer for business logic
//!
//! HTTP handlers and the CLI both go through these types; nothing here
//! touches actix request plumbing beyond reading headers.

pub mod bot_router;
pub mod messages;
pub mod notifier;
pub mod redirect;
pub mod tracking_link;

pub use bot_router::BotRouter;
pub use notifier::{ClickEvent, NotificationDispatcher, Notifier, NotifyError, TelegramNotifier};
pub use redirect::{RedirectOutcome, RedirectResolver, RequestMeta};
pub use tracking_link::build_link;
