//! # Configuration DTOs / 配置数据结构
//!
//! Pure data mapped from the TOML config file. The only "logic" here is the
//! v1 tuning defaults, kept in [`PairingTuning::defaults`] so there is one
//! place that owns them.

use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Placeholder host shipped in sample configs; never a real backend.
const PLACEHOLDER_MARKER: &str = "placeholder";

/// Upper bound for code and session lifetimes (one year).
const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Upper bound for the mock stale threshold (one day).
const MAX_STALE_AFTER_MS: i64 = 24 * 60 * 60 * 1000;

/// Application configuration DTO
/// 应用配置 DTO
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backend: BackendCredentials,
    pub pairing: PairingTuning,

    /// Local state file (path only, no existence check). Empty means
    /// "use the platform data dir".
    pub state_path: PathBuf,
}

/// Hosted backend credentials. Their presence selects the live backend.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BackendCredentials {
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl BackendCredentials {
    /// Both values set and the url is not the sample placeholder.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.anon_key.trim().is_empty()
            && !self.url.contains(PLACEHOLDER_MARKER)
    }
}

/// Timing knobs of the pairing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingTuning {
    /// Mock listener poll period.
    pub poll_interval_ms: u64,
    /// Age after which an unconsumed mock record is dropped by its initiator.
    pub stale_after_ms: i64,
    /// How long a locally cached code is reused.
    pub code_ttl_secs: i64,
    /// Lifetime of a backend session (and of the pair created from it).
    pub session_ttl_secs: i64,
    /// Per-request timeout of the HTTP client.
    pub request_timeout_secs: u64,
}

impl PairingTuning {
    /// v1 默认值（永远保留）
    pub fn defaults() -> Self {
        Self {
            poll_interval_ms: 500,
            stale_after_ms: 10_000,
            code_ttl_secs: 60 * 60,
            session_ttl_secs: 60 * 60,
            request_timeout_secs: 10,
        }
    }
}

impl PairingTuning {
    /// Session (and pair) lifetime, clamped to `0..=MAX_TTL_SECS`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs.clamp(0, MAX_TTL_SECS))
    }
}

impl AppConfig {
    /// Create AppConfig from TOML value
    /// 从 TOML 值创建 AppConfig
    ///
    /// Missing credentials stay empty (that is a fact, it selects mock mode).
    /// Missing tuning values take the v1 defaults. Negative or absurdly
    /// large lifetimes are rejected.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| -> String {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let int_at = |key: &str| -> Option<i64> {
            toml_value
                .get("pairing")
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_integer())
        };
        let bounded = |key: &str, range: RangeInclusive<i64>| -> anyhow::Result<Option<i64>> {
            match int_at(key) {
                Some(v) if !range.contains(&v) => anyhow::bail!(
                    "pairing.{key} = {v} is outside {}..={}",
                    range.start(),
                    range.end()
                ),
                other => Ok(other),
            }
        };

        let defaults = PairingTuning::defaults();
        let pairing = PairingTuning {
            poll_interval_ms: int_at("poll_interval_ms")
                .map(|v| v.max(1) as u64)
                .unwrap_or(defaults.poll_interval_ms),
            stale_after_ms: bounded("stale_after_ms", 0..=MAX_STALE_AFTER_MS)?
                .unwrap_or(defaults.stale_after_ms),
            code_ttl_secs: bounded("code_ttl_secs", 0..=MAX_TTL_SECS)?
                .unwrap_or(defaults.code_ttl_secs),
            session_ttl_secs: bounded("session_ttl_secs", 0..=MAX_TTL_SECS)?
                .unwrap_or(defaults.session_ttl_secs),
            request_timeout_secs: int_at("request_timeout_secs")
                .map(|v| v.max(1) as u64)
                .unwrap_or(defaults.request_timeout_secs),
        };

        Ok(Self {
            backend: BackendCredentials {
                url: str_at("backend", "url"),
                anon_key: str_at("backend", "anon_key"),
            },
            pairing,
            state_path: PathBuf::from(str_at("storage", "state_path")),
        })
    }

    /// Empty config: mock mode, default tuning, platform state path.
    pub fn empty() -> Self {
        Self {
            backend: BackendCredentials::default(),
            pairing: PairingTuning::defaults(),
            state_path: PathBuf::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_from_toml_reads_all_sections() {
        let toml_str = r#"
            [backend]
            url = "https://abc.supabase.co"
            anon_key = "anon"

            [pairing]
            poll_interval_ms = 1000
            stale_after_ms = 5000
            code_ttl_secs = 60
            session_ttl_secs = 120
            request_timeout_secs = 3

            [storage]
            state_path = "/tmp/state.json"
        "#;
        let value: Value = toml::from_str(toml_str).unwrap();
        let config = AppConfig::from_toml(&value).unwrap();

        assert_eq!(config.backend.url, "https://abc.supabase.co");
        assert!(config.backend.is_configured());
        assert_eq!(config.pairing.poll_interval_ms, 1000);
        assert_eq!(config.pairing.stale_after_ms, 5000);
        assert_eq!(config.pairing.code_ttl_secs, 60);
        assert_eq!(config.pairing.session_ttl_secs, 120);
        assert_eq!(config.pairing.request_timeout_secs, 3);
        assert_eq!(config.state_path, PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_from_toml_missing_values_fall_back() {
        let value: Value = toml::from_str("[general]\n").unwrap();
        let config = AppConfig::from_toml(&value).unwrap();

        assert_eq!(config, AppConfig::empty());
        assert!(!config.backend.is_configured());
    }

    #[test]
    fn test_from_toml_rejects_out_of_range_lifetimes() {
        for toml_str in [
            "[pairing]\nstale_after_ms = -1\n",
            "[pairing]\ncode_ttl_secs = -60\n",
            "[pairing]\nsession_ttl_secs = 9223372036854775807\n",
        ] {
            let value: Value = toml::from_str(toml_str).unwrap();
            let err = AppConfig::from_toml(&value).unwrap_err();
            assert!(err.to_string().contains("outside"), "{toml_str}: {err}");
        }

        let value: Value = toml::from_str("[pairing]\nsession_ttl_secs = 0\n").unwrap();
        assert_eq!(AppConfig::from_toml(&value).unwrap().pairing.session_ttl_secs, 0);
    }

    #[test]
    fn test_session_ttl_is_clamped() {
        let mut tuning = PairingTuning::defaults();
        assert_eq!(tuning.session_ttl(), chrono::Duration::hours(1));

        tuning.session_ttl_secs = i64::MAX;
        assert_eq!(tuning.session_ttl(), chrono::Duration::seconds(MAX_TTL_SECS));
        tuning.session_ttl_secs = -5;
        assert_eq!(tuning.session_ttl(), chrono::Duration::zero());
    }

    #[test]
    fn test_placeholder_url_is_not_configured() {
        let creds = BackendCredentials {
            url: "https://placeholder.supabase.co".to_string(),
            anon_key: "placeholder-key".to_string(),
        };
        assert!(!creds.is_configured());

        let missing_key = BackendCredentials {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "  ".to_string(),
        };
        assert!(!missing_key.is_configured());
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = BackendCredentials {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "secret".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret"));
    }
}
