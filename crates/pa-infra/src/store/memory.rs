use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pa_core::ids::{LobbyId, PairId};
use pa_core::pairing::{NewUserPair, UserPair, UserSession};
use pa_core::ports::{PairingStorePort, StoreError};
use pa_core::UserCode;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    sessions: HashMap<UserCode, UserSession>,
    pairs: HashMap<PairId, UserPair>,
}

/// Store kept in process memory. Used with the local realtime hub to run
/// the live pairing path without a hosted service.
#[derive(Default)]
pub struct InMemoryPairingStore {
    tables: Mutex<Tables>,
}

impl InMemoryPairingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pairs(&self) -> Vec<UserPair> {
        self.tables.lock().await.pairs.values().cloned().collect()
    }
}

#[async_trait]
impl PairingStorePort for InMemoryPairingStore {
    async fn upsert_session(&self, session: &UserSession) -> Result<(), StoreError> {
        self.tables
            .lock()
            .await
            .sessions
            .insert(session.code.clone(), session.clone());
        Ok(())
    }

    async fn find_session_by_code(
        &self,
        code: &UserCode,
    ) -> Result<Option<UserSession>, StoreError> {
        Ok(self.tables.lock().await.sessions.get(code).cloned())
    }

    async fn insert_pair(&self, pair: &NewUserPair) -> Result<UserPair, StoreError> {
        let row = pair.clone().into_pair(PairId::new());
        self.tables
            .lock()
            .await
            .pairs
            .insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn mark_sessions_paired(
        &self,
        codes: &[UserCode],
        pair_id: &PairId,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        for code in codes {
            if let Some(session) = tables.sessions.get_mut(code) {
                session.mark_paired(pair_id.clone());
            }
        }
        Ok(())
    }

    async fn delete_pair(&self, pair_id: &PairId) -> Result<(), StoreError> {
        self.tables.lock().await.pairs.remove(pair_id);
        Ok(())
    }

    async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .pairs
            .values()
            .find(|p| p.lobby_id == *lobby_id)
            .cloned())
    }

    async fn delete_sessions_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at >= cutoff);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(s: &str) -> UserCode {
        UserCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn pair_lifecycle() {
        let store = InMemoryPairingStore::new();
        let now = Utc::now();
        for c in ["AAA-222-AAA", "BBB-333-BBB"] {
            store
                .upsert_session(&UserSession::new(code(c), now, Duration::hours(1)))
                .await
                .unwrap();
        }

        let pair = store
            .insert_pair(
                &NewUserPair::active(
                    code("AAA-222-AAA"),
                    code("BBB-333-BBB"),
                    LobbyId::from("lobby-1-abc"),
                    now,
                    now + Duration::hours(1),
                )
                .unwrap(),
            )
            .await
            .unwrap();

        store
            .mark_sessions_paired(&[code("AAA-222-AAA"), code("BBB-333-BBB")], &pair.id)
            .await
            .unwrap();
        let a = store.find_session_by_code(&code("AAA-222-AAA")).await.unwrap().unwrap();
        assert!(a.is_paired);
        assert_eq!(a.pair_id, Some(pair.id.clone()));

        let found = store.find_pair_by_lobby(&LobbyId::from("lobby-1-abc")).await.unwrap();
        assert_eq!(found, Some(pair.clone()));

        store.delete_pair(&pair.id).await.unwrap();
        assert!(store.pairs().await.is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_are_deleted() {
        let store = InMemoryPairingStore::new();
        let now = Utc::now();
        store
            .upsert_session(&UserSession::new(code("AAA-222-AAA"), now - Duration::hours(2), Duration::hours(1)))
            .await
            .unwrap();
        store
            .upsert_session(&UserSession::new(code("BBB-333-BBB"), now, Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.delete_sessions_expired_before(now).await.unwrap(), 1);
        assert!(store.find_session_by_code(&code("AAA-222-AAA")).await.unwrap().is_none());
        assert!(store.find_session_by_code(&code("BBB-333-BBB")).await.unwrap().is_some());
    }
}
