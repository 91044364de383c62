use std::sync::Arc;

use pa_core::ids::LobbyId;
use pa_core::pairing::{LobbyError, LobbySession};
use pa_core::ports::local_state::keys;
use pa_core::ports::{LocalStatePort, PairingBackendPort};
use pa_core::UserCode;
use tracing::info;

/// Resolve who is who in a lobby, from the viewer's stored code.
pub struct EnterLobby {
    backend: Arc<dyn PairingBackendPort>,
    local_state: Arc<dyn LocalStatePort>,
}

impl EnterLobby {
    pub fn new(backend: Arc<dyn PairingBackendPort>, local_state: Arc<dyn LocalStatePort>) -> Self {
        Self {
            backend,
            local_state,
        }
    }

    #[tracing::instrument(name = "usecase.enter_lobby.execute", skip(self), fields(lobby_id = %lobby_id))]
    pub async fn execute(&self, lobby_id: &LobbyId) -> Result<LobbySession, LobbyError> {
        let my_code = self
            .local_state
            .get(keys::USER_CODE)
            .await
            .map_err(|e| LobbyError::Backend(e.to_string()))?
            .and_then(|raw| UserCode::parse(&raw).ok())
            .ok_or(LobbyError::NoUserCode)?;

        let pair = self
            .backend
            .find_pair_by_lobby(lobby_id)
            .await
            .map_err(|e| LobbyError::Backend(e.to_string()))?
            .ok_or(LobbyError::LobbyNotFound)?;

        let session = LobbySession::resolve(&pair, &my_code)?;
        info!(role = ?session.my_role, partner = %session.partner_code, "entered lobby");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{code, MockBackend};
    use chrono::Utc;
    use pa_core::ids::PairId;
    use pa_core::pairing::{LobbyRole, PairStatus, UserPair};
    use pa_infra::InMemoryLocalStateStore;

    fn pair() -> UserPair {
        UserPair {
            id: PairId::from("pair-1"),
            user_a_code: code("AAA-222-AAA"),
            user_b_code: code("BBB-333-BBB"),
            lobby_id: LobbyId::from("lobby-1-a"),
            status: PairStatus::Active,
            created_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    async fn state_with_code(c: &str) -> Arc<InMemoryLocalStateStore> {
        let state = Arc::new(InMemoryLocalStateStore::new());
        state.set(keys::USER_CODE, c).await.unwrap();
        state
    }

    #[tokio::test]
    async fn member_gets_role_and_partner() {
        let mut backend = MockBackend::new();
        backend
            .expect_find_pair_by_lobby()
            .returning(|_| Ok(Some(pair())));
        let uc = EnterLobby::new(Arc::new(backend), state_with_code("BBB-333-BBB").await);

        let session = uc.execute(&LobbyId::from("lobby-1-a")).await.unwrap();
        assert_eq!(session.my_role, LobbyRole::UserB);
        assert_eq!(session.partner_code, code("AAA-222-AAA"));
    }

    #[tokio::test]
    async fn missing_user_code_is_reported_before_lookup() {
        let mut backend = MockBackend::new();
        backend.expect_find_pair_by_lobby().never();
        let uc = EnterLobby::new(Arc::new(backend), Arc::new(InMemoryLocalStateStore::new()));

        let err = uc.execute(&LobbyId::from("lobby-1-a")).await.unwrap_err();
        assert_eq!(err, LobbyError::NoUserCode);
    }

    #[tokio::test]
    async fn unknown_lobby_and_outsider_are_rejected() {
        let mut backend = MockBackend::new();
        backend
            .expect_find_pair_by_lobby()
            .withf(|lobby| lobby.as_str() == "lobby-gone")
            .returning(|_| Ok(None));
        backend
            .expect_find_pair_by_lobby()
            .withf(|lobby| lobby.as_str() == "lobby-1-a")
            .returning(|_| Ok(Some(pair())));
        let uc = EnterLobby::new(Arc::new(backend), state_with_code("CCC-444-CCC").await);

        assert_eq!(
            uc.execute(&LobbyId::from("lobby-gone")).await.unwrap_err(),
            LobbyError::LobbyNotFound
        );
        assert_eq!(
            uc.execute(&LobbyId::from("lobby-1-a")).await.unwrap_err(),
            LobbyError::NotAMember
        );
    }
}
