use std::fmt;

/// token 解码失败的具体原因
///
/// 只用于内部日志；对外统一返回 "Invalid link"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// 段数不对或 base64 非法，在验签之前就被拒绝
    MalformedToken,
    InvalidSignature,
    /// 签名正确但载荷不是合法的 TrackingClaim
    MalformedPayload,
    Expired,
}

impl TokenError {
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::MalformedToken => "malformed_token",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::MalformedPayload => "malformed_payload",
            TokenError::Expired => "expired",
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::MalformedToken => write!(f, "token is malformed"),
            TokenError::InvalidSignature => write!(f, "token signature is invalid"),
            TokenError::MalformedPayload => write!(f, "token payload is not a tracking claim"),
            TokenError::Expired => write!(f, "token has expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// token 生成失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    InvalidClaim(String),
    Signing(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::InvalidClaim(msg) => write!(f, "invalid claim: {}", msg),
            EncodeError::Signing(msg) => write!(f, "failed to sign token: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}
