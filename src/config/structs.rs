use serde::{Deserialize, Serialize};

use crate::errors::{LinkTrkrError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "LT";

/// 静态配置（从 TOML + 环境变量加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - bot: Bot API token、用户名、webhook 密钥
/// - token: 签名密钥与有效期
/// - notify: 点击通知的超时与并发上限
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LT，分隔符：__
    /// 示例：LT__TOKEN__SECRET=change-me
    pub fn load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config = settings.try_deserialize::<StaticConfig>()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 启动 HTTP 服务前的必填项检查
    pub fn validate(&self) -> Result<()> {
        if self.token.secret.is_empty() {
            return Err(LinkTrkrError::config(
                "token.secret is required (LT__TOKEN__SECRET)",
            ));
        }
        if self.bot.token.is_empty() {
            return Err(LinkTrkrError::config(
                "bot.token is required (LT__BOT__TOKEN)",
            ));
        }
        self.bot.validate_webhook_secret()?;
        if self.notify.max_in_flight == 0 {
            return Err(LinkTrkrError::config("notify.max_in_flight must be > 0"));
        }
        if self.notify.timeout_secs == 0 {
            return Err(LinkTrkrError::config("notify.timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 把默认配置写入文件
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LinkTrkrError::Serialization(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| {
            LinkTrkrError::file_operation(format!("Failed to write {}: {}", path, e))
        })
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 机器人配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token
    #[serde(default)]
    pub token: String,
    /// 机器人用户名（不带 @），用于欢迎语和首页
    #[serde(default = "default_bot_username")]
    pub username: String,
    /// X-Telegram-Bot-Api-Secret-Token 的期望值
    #[serde(default)]
    pub webhook_secret: String,
    /// 配置后首页会经过一个归属该会话的跟踪链接再跳转到机器人
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl BotConfig {
    /// Telegram 只接受 1-256 个 `A-Z a-z 0-9 _ -` 字符作为 secret_token
    pub fn validate_webhook_secret(&self) -> Result<()> {
        let secret = &self.webhook_secret;
        if secret.is_empty() {
            return Err(LinkTrkrError::config(
                "bot.webhook_secret is required (LT__BOT__WEBHOOK_SECRET)",
            ));
        }
        if secret.len() > 256
            || !secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(LinkTrkrError::config(
                "bot.webhook_secret must be 1-256 characters of A-Z, a-z, 0-9, _ and -",
            ));
        }
        Ok(())
    }
}

/// 签名配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenConfig {
    #[serde(default)]
    pub secret: String,
    /// 不配置则 token 永不过期
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

/// 点击通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_bot_username() -> String {
    "LinkTrkrBot".to_string()
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_notify_timeout() -> u64 {
    10
}

fn default_max_in_flight() -> usize {
    64
}

fn default_shutdown_grace() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            username: default_bot_username(),
            webhook_secret: String::new(),
            admin_chat_id: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_notify_timeout(),
            max_in_flight: default_max_in_flight(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
