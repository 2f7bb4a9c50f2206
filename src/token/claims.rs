use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 点击通知的接收方
///
/// Telegram 的 chat_id 既可以是数字，也可以是 `@channelusername`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerId {
    Id(i64),
    Username(String),
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerId::Id(id) => write!(f, "{}", id),
            OwnerId::Username(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        OwnerId::Id(id)
    }
}

impl std::str::FromStr for OwnerId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => OwnerId::Id(id),
            Err(_) => OwnerId::Username(s.trim().to_string()),
        })
    }
}

/// 嵌入在 token 里的跟踪声明
///
/// 序列化后只包含 `url` 与 `chat_id`；`issued_at` / `expires_at` 来自
/// JWT 的 `iat` / `exp`，只在解码后才有值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingClaim {
    pub url: String,
    /// 旧版 webhook 签发的 token 用 `userId`
    #[serde(rename = "chat_id", alias = "userId")]
    pub owner_id: OwnerId,
    #[serde(skip)]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TrackingClaim {
    pub fn new(url: impl Into<String>, owner_id: impl Into<OwnerId>) -> Self {
        Self {
            url: url.into(),
            owner_id: owner_id.into(),
            issued_at: None,
            expires_at: None,
        }
    }
}
