//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Pick the pairing backend once, from the loaded credentials
//! - ✅ Build the adapters and hand them out as port trait objects
//! - ✅ Construct use cases on demand from those ports
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No pairing logic / 禁止包含配对逻辑**
//! - Callers of `AppDeps` never learn which backend is active beyond `mode()`
//!
//! > This is the only place that depends on pa-infra and pa-app together.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pa_app::{
    CleanupExpiredSessions, CurrentLobby, EnsureUserCode, EnterLobby, InitiatePartnerPairing,
    JoinGameRoom, PairingListener,
};
use pa_core::config::{AppConfig, PairingTuning};
use pa_core::ports::{
    BackendMode, ClockPort, LobbyNavigatorPort, LocalStatePort, PairingBackendPort,
    RealtimeError, RealtimePort, StoreError,
};
use pa_infra::{
    FileLocalStateStore, LivePairingBackend, LocalRealtimeHub, MockPairingBackend,
    PostgrestPairingStore, SupabaseRealtime, SystemClock,
};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Pairing store initialization failed: {0}")]
    StoreInit(#[from] StoreError),

    #[error("Realtime initialization failed: {0}")]
    RealtimeInit(#[from] RealtimeError),
}

/// Ports shared by every use case of one process.
#[derive(Clone)]
pub struct AppDeps {
    pub backend: Arc<dyn PairingBackendPort>,
    pub realtime: Arc<dyn RealtimePort>,
    pub local_state: Arc<dyn LocalStatePort>,
    pub clock: Arc<dyn ClockPort>,
    pub tuning: PairingTuning,
}

impl AppDeps {
    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    pub fn ensure_user_code(&self) -> EnsureUserCode {
        EnsureUserCode::new(
            self.backend.clone(),
            self.local_state.clone(),
            self.clock.clone(),
            &self.tuning,
        )
    }

    pub fn initiate_partner_pairing(&self) -> InitiatePartnerPairing {
        InitiatePartnerPairing::new(
            self.backend.clone(),
            self.local_state.clone(),
            self.clock.clone(),
            &self.tuning,
        )
    }

    pub fn pairing_listener(&self, navigator: Arc<dyn LobbyNavigatorPort>) -> PairingListener {
        PairingListener::new(self.backend.clone(), self.local_state.clone(), navigator)
    }

    pub fn enter_lobby(&self) -> EnterLobby {
        EnterLobby::new(self.backend.clone(), self.local_state.clone())
    }

    pub fn current_lobby(&self) -> CurrentLobby {
        CurrentLobby::new(self.local_state.clone())
    }

    pub fn join_game_room(&self) -> JoinGameRoom {
        JoinGameRoom::new(self.realtime.clone())
    }

    pub fn cleanup_expired_sessions(&self) -> CleanupExpiredSessions {
        CleanupExpiredSessions::new(self.backend.clone(), self.clock.clone())
    }
}

/// Wire all adapters.
///
/// Configured credentials select the live backend (PostgREST store plus
/// Supabase realtime). Anything else selects the device-local mock, with an
/// in-process hub standing in for realtime.
///
/// # Errors / 错误
///
/// Returns `WiringError` when a live adapter cannot be built from the
/// configured url.
pub fn wire_dependencies(config: &AppConfig, state_path: PathBuf) -> WiringResult<AppDeps> {
    let tuning = config.pairing;
    let local_state: Arc<dyn LocalStatePort> = Arc::new(FileLocalStateStore::new(state_path));
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    let (backend, realtime): (Arc<dyn PairingBackendPort>, Arc<dyn RealtimePort>) =
        if config.backend.is_configured() {
            let timeout = Duration::from_secs(tuning.request_timeout_secs);
            let store = Arc::new(PostgrestPairingStore::new(
                &config.backend.url,
                &config.backend.anon_key,
                timeout,
            )?);
            let realtime: Arc<dyn RealtimePort> = Arc::new(SupabaseRealtime::new(
                &config.backend.url,
                &config.backend.anon_key,
                timeout,
            )?);
            tracing::info!(url = %config.backend.url, "Using live pairing backend");
            (
                Arc::new(LivePairingBackend::new(store, realtime.clone())),
                realtime,
            )
        } else {
            tracing::warn!("Backend credentials not configured, using device-local mock pairing");
            (
                Arc::new(MockPairingBackend::new(
                    local_state.clone(),
                    clock.clone(),
                    &tuning,
                )),
                Arc::new(LocalRealtimeHub::new()),
            )
        };

    Ok(AppDeps {
        backend,
        realtime,
        local_state,
        clock,
        tuning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_core::config::BackendCredentials;
    use tempfile::TempDir;

    #[tokio::test]
    async fn empty_credentials_select_mock_backend() {
        let dir = TempDir::new().unwrap();
        let deps = wire_dependencies(&AppConfig::empty(), dir.path().join("state.json")).unwrap();

        assert_eq!(deps.mode(), BackendMode::Mock);
        assert!(!deps.backend.is_configured());

        let code = deps.ensure_user_code().execute().await.unwrap();
        let again = deps.ensure_user_code().execute().await.unwrap();
        assert_eq!(code, again);
    }

    #[test]
    fn configured_credentials_select_live_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::empty();
        config.backend = BackendCredentials {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        };

        let deps = wire_dependencies(&config, dir.path().join("state.json")).unwrap();
        assert_eq!(deps.mode(), BackendMode::Live);
        assert!(deps.backend.is_configured());
    }

    #[test]
    fn unusable_url_is_a_wiring_error() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::empty();
        config.backend = BackendCredentials {
            url: "not a url".to_string(),
            anon_key: "anon".to_string(),
        };

        let err = wire_dependencies(&config, dir.path().join("state.json"))
            .err()
            .unwrap();
        assert!(matches!(err, WiringError::StoreInit(_)));
    }
}
