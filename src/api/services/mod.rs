pub mod frontend;
pub mod redirect;
pub mod webhook;

use actix_web::dev::HttpServiceFactory;
use actix_web::{HttpResponse, web};

pub use frontend::{FrontendService, LandingPage};
pub use redirect::RedirectService;
pub use webhook::WebhookService;

use crate::api::constants::TEXT_CONTENT_TYPE;
use crate::api::middleware::WebhookAuth;
use crate::services::tracking_link::REDIRECT_PREFIX;

/// `/`：POST 是 webhook（需要密钥），GET 是落地页
pub fn root_routes(webhook_secret: &str) -> impl HttpServiceFactory + 'static {
    web::resource("/")
        .route(web::post().to(WebhookService::handle_update))
        .route(web::get().to(FrontendService::handle_index))
        .default_service(web::to(not_found))
        .wrap(WebhookAuth::new(webhook_secret))
}

/// `/r/{token}`，空 token 也会走到解析逻辑并得到 400
pub fn redirect_routes() -> impl HttpServiceFactory + 'static {
    web::resource(format!("{}{{token:.*}}", REDIRECT_PREFIX))
        .route(web::get().to(RedirectService::handle_redirect))
        .default_service(web::to(not_found))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(TEXT_CONTENT_TYPE)
        .body("Not Found")
}
