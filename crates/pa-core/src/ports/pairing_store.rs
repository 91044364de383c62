use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::StoreError;
use crate::code::UserCode;
use crate::ids::{LobbyId, PairId};
use crate::pairing::{NewUserPair, UserPair, UserSession};

/// Relational store holding `user_sessions` and `user_pairs`.
///
/// Each method is one round trip; no caching is expected.
#[async_trait]
pub trait PairingStorePort: Send + Sync {
    /// Insert, or overwrite the row with the same code.
    async fn upsert_session(&self, session: &UserSession) -> Result<(), StoreError>;

    async fn find_session_by_code(&self, code: &UserCode)
        -> Result<Option<UserSession>, StoreError>;

    async fn insert_pair(&self, pair: &NewUserPair) -> Result<UserPair, StoreError>;

    /// Set `is_paired = true, pair_id = pair_id` on every listed session.
    async fn mark_sessions_paired(
        &self,
        codes: &[UserCode],
        pair_id: &PairId,
    ) -> Result<(), StoreError>;

    async fn delete_pair(&self, pair_id: &PairId) -> Result<(), StoreError>;

    async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, StoreError>;

    /// Returns the number of deleted sessions.
    async fn delete_sessions_expired_before(&self, cutoff: DateTime<Utc>)
        -> Result<u64, StoreError>;
}
