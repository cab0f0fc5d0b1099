use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Falls back to loading `config.toml` if nothing initialized it yet.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(None)))
        .load_full()
}

/// Initialize the global configuration from `config.toml` + environment
pub fn init_config() {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(None)));
}

/// Initialize the global configuration from an explicit file path
///
/// If the configuration was already initialized, the new values replace it.
pub fn init_config_from(path: Option<&str>) {
    let config = StaticConfig::load(path);
    match CONFIG.get() {
        Some(existing) => existing.store(Arc::new(config)),
        None => {
            CONFIG.get_or_init(|| ArcSwap::from_pointee(config));
        }
    }
}
