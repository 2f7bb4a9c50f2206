/// 跟踪链接的路径前缀
pub const REDIRECT_PREFIX: &str = "/r/";

/// 拼出对外的跟踪链接：`https://{domain}/r/{token}`
///
/// domain 来自请求自身的 Host，不是用户输入，这里不做校验。
pub fn build_link(domain: &str, token: &str) -> String {
    format!("https://{}{}{}", domain, REDIRECT_PREFIX, token)
}
