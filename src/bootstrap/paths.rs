use std::path::PathBuf;

use anyhow::Context;

const APP_DIR_NAME: &str = "pair-arcade";

fn resolved_app_dir_name() -> String {
    match std::env::var("PAIR_ARCADE_PROFILE") {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

/// Concrete file locations under the per-user data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            config_path: root.join("config.toml"),
            state_path: root.join("state.json"),
            logs_dir: root.join("logs"),
        }
    }

    /// Paths under `dirs::data_local_dir()`.
    pub fn resolve() -> anyhow::Result<Self> {
        let base = dirs::data_local_dir().context("no local data directory on this platform")?;
        Ok(Self::from_root(base.join(resolved_app_dir_name())))
    }
}
