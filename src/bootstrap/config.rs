//! # Configuration Loader / 配置加载器
//!
//! Reads the TOML file into the `AppConfig` DTO and lays the environment
//! overrides for the backend credentials on top. No validation happens
//! here: whether the credentials are usable is decided by the wiring.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pa_core::config::AppConfig;

pub const ENV_BACKEND_URL: &str = "PAIR_ARCADE_BACKEND_URL";
pub const ENV_BACKEND_KEY: &str = "PAIR_ARCADE_BACKEND_KEY";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// An explicit path must exist. Without one, the default location is used
/// when present and an empty config otherwise.
pub fn load_or_default(
    explicit: Option<PathBuf>,
    default_path: &Path,
) -> anyhow::Result<AppConfig> {
    match explicit {
        Some(path) => load_config(path),
        None if default_path.exists() => load_config(default_path.to_path_buf()),
        None => Ok(AppConfig::empty()),
    }
}

/// Non-empty `PAIR_ARCADE_BACKEND_URL` / `PAIR_ARCADE_BACKEND_KEY` win over
/// the file.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(url) = non_empty_env(ENV_BACKEND_URL) {
        config.backend.url = url;
    }
    if let Some(key) = non_empty_env(ENV_BACKEND_KEY) {
        config.backend.anon_key = key;
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
