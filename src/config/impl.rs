use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Before `init_config` runs this yields the
/// built-in defaults.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from the given TOML path (optional) and `LT__*`
/// environment variables. Calling it again replaces the previous value.
pub fn init_config(path: &str) -> Result<Arc<StaticConfig>> {
    let config = Arc::new(StaticConfig::load(path)?);
    set_config(config.clone());
    Ok(config)
}

/// 直接替换全局配置
pub fn set_config(config: Arc<StaticConfig>) {
    CONFIG
        .get_or_init(|| ArcSwap::new(config.clone()))
        .store(config);
}
