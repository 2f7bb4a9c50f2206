//! Webhook 入口：POST /
//!
//! 解析 Update → BotRouter → 把回复作为响应体直接返回给 Bot API。

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error, trace, warn};

use crate::api::constants::{JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
use crate::services::BotRouter;
use crate::telegram::Update;
use crate::utils::host_without_port;

pub struct WebhookService;

impl WebhookService {
    pub async fn handle_update(
        req: HttpRequest,
        body: web::Bytes,
        router: web::Data<BotRouter>,
    ) -> HttpResponse {
        let update: Update = match serde_json::from_slice(&body) {
            Ok(update) => update,
            Err(e) => {
                warn!("Rejected webhook body ({} bytes): {}", body.len(), e);
                return HttpResponse::BadRequest()
                    .content_type(TEXT_CONTENT_TYPE)
                    .body("Bad Request");
            }
        };
        trace!("Received update {}", update.update_id);

        let reply = {
            let conn = req.connection_info();
            let domain = host_without_port(conn.host());
            router.route(&update, domain)
        };

        match serde_json::to_vec(&reply) {
            Ok(body) => {
                debug!(
                    "Update {} answered with {}",
                    update.update_id,
                    reply.as_call().map_or("ack", |call| call.method_name())
                );
                HttpResponse::Ok().content_type(JSON_CONTENT_TYPE).body(body)
            }
            Err(e) => {
                error!("Failed to serialize reply for update {}: {}", update.update_id, e);
                HttpResponse::InternalServerError()
                    .content_type(TEXT_CONTENT_TYPE)
                    .body("Internal Server Error")
            }
        }
    }
}
