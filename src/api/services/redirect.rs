use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::warn;

use crate::api::constants::TEXT_CONTENT_TYPE;
use crate::services::redirect::INVALID_LINK;
use crate::services::{RedirectOutcome, RedirectResolver, RequestMeta};
use crate::utils::validate_url;

pub struct RedirectService;

impl RedirectService {
    /// GET /r/{token}
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        resolver: web::Data<RedirectResolver>,
    ) -> HttpResponse {
        let token = path.into_inner();
        let meta = RequestMeta::from_headers(req.headers());

        match resolver.resolve(&token, &meta) {
            RedirectOutcome::RedirectTo(url) => match Self::location(&url) {
                Some(location) => HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .insert_header((header::CACHE_CONTROL, "no-store"))
                    .finish(),
                None => {
                    warn!("Destination cannot be sent as Location header: {}", url);
                    Self::reject(StatusCode::BAD_REQUEST, INVALID_LINK)
                }
            },
            RedirectOutcome::Reject { status, message } => Self::reject(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
                message,
            ),
        }
    }

    /// 非 ASCII 的 URL 不能直接做 header，改用解析后的规范化形式
    fn location(url: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(url).ok().or_else(|| {
            validate_url(url)
                .ok()
                .and_then(|parsed| HeaderValue::from_str(parsed.as_str()).ok())
        })
    }

    #[inline]
    fn reject(status: StatusCode, message: &'static str) -> HttpResponse {
        HttpResponse::build(status)
            .content_type(TEXT_CONTENT_TYPE)
            .body(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_normalizes_non_ascii() {
        assert_eq!(
            RedirectService::location("https://dest.example/a?b=1").unwrap(),
            "https://dest.example/a?b=1"
        );
        assert_eq!(
            RedirectService::location("https://dest.example/é").unwrap(),
            "https://dest.example/%C3%A9"
        );
    }
}
