use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pa_core::config::PairingTuning;
use pa_core::ids::{LobbyId, PairId};
use pa_core::pairing::{
    MockPairingRecord, MockRecordRole, NewUserPair, PairStatus, PairingEvent, Topic, UserPair,
    UserSession,
};
use pa_core::ports::local_state::keys;
use pa_core::ports::{
    BackendError, BackendMode, ClockPort, LocalStatePort, PairingBackendPort, PairingSubscription,
    Subscription,
};
use pa_core::UserCode;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Lifetime stamped on synthesized sessions and pairs.
fn mock_ttl() -> chrono::Duration {
    chrono::Duration::hours(1)
}

const EVENT_BUFFER: usize = 4;

/// Single-device simulation of the backend.
///
/// There is no shared store: partners "exist" as long as their code looks
/// plausible, pairs are never persisted, and the only channel between two
/// participants is the one `mockPairing` record in local state. A second
/// pairing overwrites an undelivered first one.
pub struct MockPairingBackend {
    local_state: Arc<dyn LocalStatePort>,
    clock: Arc<dyn ClockPort>,
    poller: MockRecordPoller,
    poll_interval: Duration,
}

/// Reads the shared record on behalf of one listener.
#[derive(Clone)]
struct MockRecordPoller {
    local_state: Arc<dyn LocalStatePort>,
    clock: Arc<dyn ClockPort>,
    stale_after_ms: i64,
}

impl MockRecordPoller {
    async fn poll(&self, my_code: &UserCode) -> Result<Option<PairingEvent>, BackendError> {
        let Some(raw) = self.local_state.get(keys::MOCK_PAIRING).await? else {
            return Ok(None);
        };

        let record: MockPairingRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "discarding unreadable mock pairing record");
                self.local_state.remove(keys::MOCK_PAIRING).await?;
                return Ok(None);
            }
        };

        match record.role_of(my_code) {
            MockRecordRole::Target => {
                self.local_state.remove(keys::MOCK_PAIRING).await?;
                info!(lobby_id = %record.lobby_id, "mock pairing record consumed");
                Ok(Some(record.to_event()))
            }
            MockRecordRole::Initiator
                if record.is_stale(self.clock.now_ms(), self.stale_after_ms) =>
            {
                self.local_state.remove(keys::MOCK_PAIRING).await?;
                debug!(lobby_id = %record.lobby_id, "stale mock pairing record removed");
                Ok(None)
            }
            MockRecordRole::Initiator | MockRecordRole::Unrelated => Ok(None),
        }
    }
}

impl MockPairingBackend {
    pub fn new(
        local_state: Arc<dyn LocalStatePort>,
        clock: Arc<dyn ClockPort>,
        tuning: &PairingTuning,
    ) -> Self {
        let poller = MockRecordPoller {
            local_state: local_state.clone(),
            clock: clock.clone(),
            stale_after_ms: tuning.stale_after_ms.max(0),
        };
        Self {
            local_state,
            clock,
            poller,
            poll_interval: Duration::from_millis(tuning.poll_interval_ms.max(1)),
        }
    }

    /// One listener tick for `my_code`: consume a record addressed to us, or
    /// drop our own record once it went stale.
    pub async fn poll_mock_record(
        &self,
        my_code: &UserCode,
    ) -> Result<Option<PairingEvent>, BackendError> {
        self.poller.poll(my_code).await
    }

    async fn stored_code(&self, key: &str) -> Result<Option<UserCode>, BackendError> {
        Ok(self
            .local_state
            .get(key)
            .await?
            .and_then(|raw| UserCode::parse(&raw).ok()))
    }
}

#[async_trait]
impl PairingBackendPort for MockPairingBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Mock
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn register_session(&self, _session: &UserSession) -> Result<(), BackendError> {
        Ok(())
    }

    /// Every canonical code "exists".
    async fn find_session(&self, code: &UserCode) -> Result<Option<UserSession>, BackendError> {
        Ok(Some(UserSession::new(
            code.clone(),
            self.clock.now_utc(),
            mock_ttl(),
        )))
    }

    async fn create_pair(&self, pair: NewUserPair) -> Result<UserPair, BackendError> {
        Ok(pair.into_pair(PairId::new()))
    }

    async fn mark_paired(&self, _codes: &[UserCode], _pair_id: &PairId) -> Result<(), BackendError> {
        Ok(())
    }

    async fn rollback_pair(&self, _pair_id: &PairId) -> Result<(), BackendError> {
        Ok(())
    }

    async fn notify_partner(
        &self,
        target: &UserCode,
        event: &PairingEvent,
    ) -> Result<(), BackendError> {
        let record = MockPairingRecord {
            my_code: event.partner_code.clone(),
            partner_code: target.clone(),
            lobby_id: event.lobby_id.clone(),
            timestamp: self.clock.now_ms(),
        };
        let raw =
            serde_json::to_string(&record).map_err(|e| BackendError::Serialization(e.to_string()))?;
        self.local_state.set(keys::MOCK_PAIRING, &raw).await?;
        debug!(%target, lobby_id = %event.lobby_id, "mock pairing record written");
        Ok(())
    }

    async fn subscribe_pairing(
        &self,
        my_code: &UserCode,
    ) -> Result<PairingSubscription, BackendError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let poller = self.poller.clone();
        let code = my_code.clone();
        let period = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match poller.poll(&code).await {
                    Ok(Some(event)) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "mock pairing poll failed"),
                }
            }
        });

        Ok(Subscription::new(
            Topic::pairing(my_code).as_str(),
            rx,
            move || task.abort(),
        ))
    }

    async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, BackendError> {
        let (Some(me), Some(partner)) = (
            self.stored_code(keys::USER_CODE).await?,
            self.stored_code(keys::PARTNER_CODE).await?,
        ) else {
            return Ok(None);
        };

        let now = self.clock.now_utc();
        Ok(Some(UserPair {
            id: PairId::new(),
            user_a_code: me,
            user_b_code: partner,
            lobby_id: lobby_id.clone(),
            status: PairStatus::Active,
            created_at: now,
            expires_at: now + mock_ttl(),
        }))
    }

    async fn cleanup_expired_sessions(&self, _now: DateTime<Utc>) -> Result<u64, BackendError> {
        Ok(0)
    }
}
