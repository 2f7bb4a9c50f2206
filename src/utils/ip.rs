//! IP 地址处理工具
//!
//! 按代理头优先级提取访问者 IP：
//! CF-Connecting-IP → X-Forwarded-For（取第一个）→ X-Real-IP

use actix_web::http::header::HeaderMap;

pub const CONNECTING_IP_HEADER: &str = "cf-connecting-ip";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// 读取单个 header，空值视为不存在
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 从 HeaderMap 提取客户端 IP
///
/// X-Forwarded-For 可能是 `client, proxy1, proxy2`，只取最左边的原始客户端。
pub fn extract_client_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    header_value(headers, CONNECTING_IP_HEADER)
        .map(String::from)
        .or_else(|| {
            header_value(headers, FORWARDED_FOR_HEADER)
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .or_else(|| header_value(headers, REAL_IP_HEADER).map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut req = TestRequest::default();
        for pair in pairs {
            req = req.insert_header(*pair);
        }
        req.to_http_request().headers().clone()
    }

    #[test]
    fn test_connecting_ip_wins() {
        let h = headers(&[
            ("CF-Connecting-IP", "203.0.113.7"),
            ("X-Forwarded-For", "198.51.100.1"),
            ("X-Real-IP", "192.0.2.1"),
        ]);
        assert_eq!(
            extract_client_ip_from_headers(&h).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let h = headers(&[
            ("X-Forwarded-For", "198.51.100.1, 10.0.0.2, 10.0.0.3"),
            ("X-Real-IP", "192.0.2.1"),
        ]);
        assert_eq!(
            extract_client_ip_from_headers(&h).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let h = headers(&[("X-Real-IP", "192.0.2.1")]);
        assert_eq!(
            extract_client_ip_from_headers(&h).as_deref(),
            Some("192.0.2.1")
        );
    }

    #[test]
    fn test_empty_headers_skipped() {
        let h = headers(&[("CF-Connecting-IP", "  "), ("X-Real-IP", "192.0.2.9")]);
        assert_eq!(
            extract_client_ip_from_headers(&h).as_deref(),
            Some("192.0.2.9")
        );
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(extract_client_ip_from_headers(&HeaderMap::new()), None);
    }
}
