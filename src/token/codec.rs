use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::claims::TrackingClaim;
use super::error::{EncodeError, TokenError};
use crate::utils::url_validator::validate_url;

/// JWT 载荷
///
/// 声明本身以 JSON 字符串形式放在 `data` 里，与旧版 Worker 签发的 token 保持兼容。
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPayload {
    data: String,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Token 编解码器（HS256）
///
/// 无状态：验证只依赖签名密钥，任意实例都能验证其他实例签发的 token。
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl_secs: Option<u64>,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp 是可选的，过期检查由 decode 自己做（now >= exp 即过期，无 leeway）
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl_secs: None,
        }
    }

    /// 设置 `issue` 使用的默认有效期
    pub fn with_default_ttl(mut self, ttl_secs: Option<u64>) -> Self {
        self.default_ttl_secs = ttl_secs;
        self
    }

    /// Create TokenCodec from config
    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self::new(config.token.secret.as_bytes()).with_default_ttl(config.token.ttl_secs)
    }

    pub fn default_ttl_secs(&self) -> Option<u64> {
        self.default_ttl_secs
    }

    /// 使用默认有效期签发 token
    pub fn issue(&self, claim: &TrackingClaim) -> Result<String, EncodeError> {
        self.encode(claim, self.default_ttl_secs)
    }

    /// 签发 token：`iat` 总是写入，`ttl_secs` 存在时写入 `exp = now + ttl`
    pub fn encode(
        &self,
        claim: &TrackingClaim,
        ttl_secs: Option<u64>,
    ) -> Result<String, EncodeError> {
        validate_url(&claim.url).map_err(|e| EncodeError::InvalidClaim(e.to_string()))?;
        if matches!(&claim.owner_id, super::OwnerId::Username(name) if name.trim().is_empty()) {
            return Err(EncodeError::InvalidClaim("owner id cannot be empty".into()));
        }

        let now = Utc::now().timestamp();
        let exp = match ttl_secs {
            None => None,
            Some(ttl) => Some(
                i64::try_from(ttl)
                    .ok()
                    .and_then(|ttl| now.checked_add(ttl))
                    .ok_or_else(|| EncodeError::InvalidClaim(format!("ttl {} out of range", ttl)))?,
            ),
        };

        let payload = RawPayload {
            data: serde_json::to_string(claim).map_err(|e| EncodeError::Signing(e.to_string()))?,
            iat: Some(now),
            exp,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| EncodeError::Signing(e.to_string()))
    }

    /// 验证并解码 token
    ///
    /// 顺序：结构检查 → 验签（常量时间）→ 解析载荷 → 过期检查。
    /// 解码不会修改 token，同一个链接可以被反复点击。
    pub fn decode(&self, token: &str) -> Result<TrackingClaim, TokenError> {
        check_structure(token)?;

        let data = jsonwebtoken::decode::<RawPayload>(token, &self.decoding_key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?;
        let raw = data.claims;

        let mut claim: TrackingClaim =
            serde_json::from_str(&raw.data).map_err(|_| TokenError::MalformedPayload)?;
        if validate_url(&claim.url).is_err() {
            return Err(TokenError::MalformedPayload);
        }

        if let Some(exp) = raw.exp
            && Utc::now().timestamp() >= exp
        {
            trace!("Token expired at {}", exp);
            return Err(TokenError::Expired);
        }

        claim.issued_at = raw.iat.and_then(|t| DateTime::from_timestamp(t, 0));
        claim.expires_at = raw.exp.and_then(|t| DateTime::from_timestamp(t, 0));
        Ok(claim)
    }
}

/// 三段式、每段都是合法的 base64url、header 可解析，否则直接判为 MalformedToken
fn check_structure(token: &str) -> Result<(), TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::MalformedToken);
    };

    for segment in [header, payload, signature] {
        if segment.is_empty() || URL_SAFE_NO_PAD.decode(segment).is_err() {
            return Err(TokenError::MalformedToken);
        }
    }

    jsonwebtoken::decode_header(token).map_err(|_| TokenError::MalformedToken)?;
    Ok(())
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::Json(_) | ErrorKind::Utf8(_) | ErrorKind::MissingRequiredClaim(_) => {
            TokenError::MalformedPayload
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::MalformedToken,
    }
}

/// 用给定密钥签发 token
pub fn encode(
    claim: &TrackingClaim,
    secret: &[u8],
    ttl_secs: Option<u64>,
) -> Result<String, EncodeError> {
    TokenCodec::new(secret).encode(claim, ttl_secs)
}

/// 用给定密钥验证并解码 token
pub fn decode(token: &str, secret: &[u8]) -> Result<TrackingClaim, TokenError> {
    TokenCodec::new(secret).decode(token)
}
