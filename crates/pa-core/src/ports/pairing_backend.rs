use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::BackendError;
use super::subscription::Subscription;
use crate::code::UserCode;
use crate::ids::{LobbyId, PairId};
use crate::pairing::{NewUserPair, PairingEvent, UserPair, UserSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Device-local simulation.
    Mock,
    /// Hosted store + realtime channel.
    Live,
}

pub type PairingSubscription = Subscription<PairingEvent>;

/// Everything the pairing flow needs from "the backend".
///
/// Two implementations exist (mock and live); exactly one is chosen at
/// startup and injected. Callers never branch on the mode.
#[async_trait]
pub trait PairingBackendPort: Send + Sync {
    fn mode(&self) -> BackendMode;

    /// `true` when backed by real remote credentials.
    fn is_configured(&self) -> bool;

    /// Make a freshly generated code discoverable by partners.
    async fn register_session(&self, session: &UserSession) -> Result<(), BackendError>;

    async fn find_session(&self, code: &UserCode) -> Result<Option<UserSession>, BackendError>;

    /// Commit point of a pairing transaction.
    async fn create_pair(&self, pair: NewUserPair) -> Result<UserPair, BackendError>;

    async fn mark_paired(&self, codes: &[UserCode], pair_id: &PairId) -> Result<(), BackendError>;

    /// Compensating delete for a pair whose session update failed.
    async fn rollback_pair(&self, pair_id: &PairId) -> Result<(), BackendError>;

    /// Fire-and-forget delivery of `event` to `target`.
    async fn notify_partner(
        &self,
        target: &UserCode,
        event: &PairingEvent,
    ) -> Result<(), BackendError>;

    /// Stream of pairing events addressed to `my_code`.
    async fn subscribe_pairing(&self, my_code: &UserCode)
        -> Result<PairingSubscription, BackendError>;

    async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, BackendError>;

    /// Delete sessions that expired before `now`; returns how many.
    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, BackendError>;
}
