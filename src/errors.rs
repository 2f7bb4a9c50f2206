use std::fmt;

use crate::services::notifier::NotifyError;
use crate::token::{EncodeError, TokenError};

#[derive(Debug, Clone)]
pub enum LinkTrkrError {
    Config(String),
    Validation(String),
    TokenEncode(String),
    TokenDecode(String),
    Notify(String),
    FileOperation(String),
    Serialization(String),
    Server(String),
}

impl LinkTrkrError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkTrkrError::Config(_) => "E001",
            LinkTrkrError::Validation(_) => "E002",
            LinkTrkrError::TokenEncode(_) => "E003",
            LinkTrkrError::TokenDecode(_) => "E004",
            LinkTrkrError::Notify(_) => "E005",
            LinkTrkrError::FileOperation(_) => "E006",
            LinkTrkrError::Serialization(_) => "E007",
            LinkTrkrError::Server(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkTrkrError::Config(_) => "Configuration Error",
            LinkTrkrError::Validation(_) => "Validation Error",
            LinkTrkrError::TokenEncode(_) => "Token Encode Error",
            LinkTrkrError::TokenDecode(_) => "Token Decode Error",
            LinkTrkrError::Notify(_) => "Notification Error",
            LinkTrkrError::FileOperation(_) => "File Operation Error",
            LinkTrkrError::Serialization(_) => "Serialization Error",
            LinkTrkrError::Server(_) => "Server Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkTrkrError::Config(msg)
            | LinkTrkrError::Validation(msg)
            | LinkTrkrError::TokenEncode(msg)
            | LinkTrkrError::TokenDecode(msg)
            | LinkTrkrError::Notify(msg)
            | LinkTrkrError::FileOperation(msg)
            | LinkTrkrError::Serialization(msg)
            | LinkTrkrError::Server(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkTrkrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkTrkrError {}

// 便捷的构造函数
impl LinkTrkrError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkTrkrError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkTrkrError::Validation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkTrkrError::FileOperation(msg.into())
    }

    pub fn server<T: Into<String>>(msg: T) -> Self {
        LinkTrkrError::Server(msg.into())
    }
}

impl From<EncodeError> for LinkTrkrError {
    fn from(err: EncodeError) -> Self {
        LinkTrkrError::TokenEncode(err.to_string())
    }
}

impl From<TokenError> for LinkTrkrError {
    fn from(err: TokenError) -> Self {
        LinkTrkrError::TokenDecode(err.to_string())
    }
}

impl From<NotifyError> for LinkTrkrError {
    fn from(err: NotifyError) -> Self {
        LinkTrkrError::Notify(err.to_string())
    }
}

impl From<std::io::Error> for LinkTrkrError {
    fn from(err: std::io::Error) -> Self {
        LinkTrkrError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkTrkrError {
    fn from(err: serde_json::Error) -> Self {
        LinkTrkrError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for LinkTrkrError {
    fn from(err: config::ConfigError) -> Self {
        LinkTrkrError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkTrkrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            LinkTrkrError::config("a"),
            LinkTrkrError::validation("b"),
            LinkTrkrError::TokenEncode("c".into()),
            LinkTrkrError::TokenDecode("d".into()),
            LinkTrkrError::Notify("e".into()),
            LinkTrkrError::file_operation("f"),
            LinkTrkrError::Serialization("g".into()),
            LinkTrkrError::server("h"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_format_simple() {
        let err = LinkTrkrError::config("token.secret is required");
        assert_eq!(
            err.format_simple(),
            "Configuration Error: token.secret is required"
        );
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_from_token_error() {
        let err: LinkTrkrError = TokenError::Expired.into();
        assert_eq!(err.code(), "E004");
        assert!(err.message().contains("expired"));
    }
}
