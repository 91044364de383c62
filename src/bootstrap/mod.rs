pub mod config;
pub mod paths;
pub mod tracing;
pub mod wiring;

pub use config::{apply_env_overrides, load_config, load_or_default};
pub use paths::AppPaths;
pub use wiring::{wire_dependencies, AppDeps, WiringError};
