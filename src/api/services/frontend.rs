//! 落地页：GET /
//!
//! 默认返回内嵌的 HTML，指向机器人；配置了 admin_chat_id 时改为 302 到一个
//! 归属管理员会话的跟踪链接，访问首页也会触发点击通知。

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use rust_embed::Embed;
use tracing::{error, trace};

use crate::api::constants::HTML_CONTENT_TYPE;
use crate::services::build_link;
use crate::token::{OwnerId, TokenCodec, TrackingClaim};
use crate::utils::{escape_html, host_without_port};

#[derive(Embed)]
#[folder = "assets/"]
struct LandingAssets;

/// 落地页所需的配置
pub struct LandingPage {
    codec: Arc<TokenCodec>,
    bot_username: String,
    admin_chat_id: Option<i64>,
}

impl LandingPage {
    pub fn new(
        codec: Arc<TokenCodec>,
        bot_username: impl Into<String>,
        admin_chat_id: Option<i64>,
    ) -> Self {
        Self {
            codec,
            bot_username: bot_username.into(),
            admin_chat_id,
        }
    }

    pub fn from_config(codec: Arc<TokenCodec>) -> Self {
        let config = crate::config::get_config();
        Self::new(codec, config.bot.username.clone(), config.bot.admin_chat_id)
    }

    pub fn bot_link(&self) -> String {
        format!("https://t.me/{}", self.bot_username)
    }

    /// 管理员跟踪链接；未配置或签发失败时返回 None
    fn admin_tracking_link(&self, domain: &str) -> Option<String> {
        let chat_id = self.admin_chat_id?;
        if self.bot_username.is_empty() {
            return None;
        }

        let claim = TrackingClaim::new(self.bot_link(), OwnerId::Id(chat_id));
        match self.codec.issue(&claim) {
            Ok(token) => Some(build_link(domain, &token)),
            Err(e) => {
                error!("Failed to create landing tracking link: {}", e);
                None
            }
        }
    }

    fn render(&self) -> String {
        let template = match LandingAssets::get("index.html") {
            Some(content) => String::from_utf8_lossy(&content.data).into_owned(),
            None => include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/index.html"))
                .to_string(),
        };

        template
            .replace("%BOT_USERNAME%", &escape_html(&self.bot_username))
            .replace("%BOT_LINK%", &escape_html(&self.bot_link()))
            .replace("%LINKTRKR_VERSION%", env!("CARGO_PKG_VERSION"))
    }
}

pub struct FrontendService;

impl FrontendService {
    pub async fn handle_index(req: HttpRequest, landing: web::Data<LandingPage>) -> HttpResponse {
        let tracking_link = {
            let conn = req.connection_info();
            landing.admin_tracking_link(host_without_port(conn.host()))
        };

        if let Some(link) = tracking_link {
            trace!("Landing page redirected through admin tracking link");
            return HttpResponse::Found()
                .insert_header((header::LOCATION, link))
                .insert_header((header::CACHE_CONTROL, "no-store"))
                .finish();
        }

        HttpResponse::Ok()
            .content_type(HTML_CONTENT_TYPE)
            .body(landing.render())
    }
}
