//! Port doubles shared by the use case tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use pa_core::ids::{LobbyId, PairId};
use pa_core::pairing::{NewUserPair, PairingEvent, UserPair, UserSession};
use pa_core::ports::{BackendError, BackendMode, ClockPort, PairingBackendPort, PairingSubscription};
use pa_core::UserCode;

mock! {
    pub Backend {}

    #[async_trait]
    impl PairingBackendPort for Backend {
        fn mode(&self) -> BackendMode;
        fn is_configured(&self) -> bool;
        async fn register_session(&self, session: &UserSession) -> Result<(), BackendError>;
        async fn find_session(&self, code: &UserCode) -> Result<Option<UserSession>, BackendError>;
        async fn create_pair(&self, pair: NewUserPair) -> Result<UserPair, BackendError>;
        async fn mark_paired(&self, codes: &[UserCode], pair_id: &PairId) -> Result<(), BackendError>;
        async fn rollback_pair(&self, pair_id: &PairId) -> Result<(), BackendError>;
        async fn notify_partner(
            &self,
            target: &UserCode,
            event: &PairingEvent,
        ) -> Result<(), BackendError>;
        async fn subscribe_pairing(
            &self,
            my_code: &UserCode,
        ) -> Result<PairingSubscription, BackendError>;
        async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, BackendError>;
        async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, BackendError>;
    }
}

/// Clock that only moves when told to.
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn at(ms: i64) -> Self {
        Self(AtomicI64::new(ms))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn code(s: &str) -> UserCode {
    UserCode::parse(s).expect("test code is canonical")
}
