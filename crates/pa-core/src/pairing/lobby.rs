use serde::{Deserialize, Serialize};

use crate::code::UserCode;
use crate::ids::LobbyId;
use crate::pairing::{LobbyError, UserPair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyRole {
    UserA,
    UserB,
}

/// The shared context both members converge on after pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySession {
    pub lobby_id: LobbyId,
    pub user_a_code: UserCode,
    pub user_b_code: UserCode,
    pub my_role: LobbyRole,
    pub partner_code: UserCode,
}

impl LobbySession {
    /// Resolve the viewer's role within `pair`.
    pub fn resolve(pair: &UserPair, my_code: &UserCode) -> Result<Self, LobbyError> {
        let (my_role, partner_code) = if pair.user_a_code == *my_code {
            (LobbyRole::UserA, pair.user_b_code.clone())
        } else if pair.user_b_code == *my_code {
            (LobbyRole::UserB, pair.user_a_code.clone())
        } else {
            return Err(LobbyError::NotAMember);
        };

        Ok(Self {
            lobby_id: pair.lobby_id.clone(),
            user_a_code: pair.user_a_code.clone(),
            user_b_code: pair.user_b_code.clone(),
            my_role,
            partner_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PairId;
    use crate::pairing::PairStatus;
    use chrono::Utc;

    fn pair() -> UserPair {
        UserPair {
            id: PairId::from("pair-1"),
            user_a_code: UserCode::parse("AAA-222-AAA").unwrap(),
            user_b_code: UserCode::parse("BBB-333-BBB").unwrap(),
            lobby_id: LobbyId::from("lobby-1-abc"),
            status: PairStatus::Active,
            created_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn resolves_roles_for_both_members() {
        let a = LobbySession::resolve(&pair(), &UserCode::parse("AAA-222-AAA").unwrap()).unwrap();
        assert_eq!(a.my_role, LobbyRole::UserA);
        assert_eq!(a.partner_code, "BBB-333-BBB");

        let b = LobbySession::resolve(&pair(), &UserCode::parse("BBB-333-BBB").unwrap()).unwrap();
        assert_eq!(b.my_role, LobbyRole::UserB);
        assert_eq!(b.partner_code, "AAA-222-AAA");
        assert_eq!(a.lobby_id, b.lobby_id);
    }

    #[test]
    fn outsiders_are_rejected() {
        let err = LobbySession::resolve(&pair(), &UserCode::parse("CCC-444-CCC").unwrap())
            .unwrap_err();
        assert_eq!(err, LobbyError::NotAMember);
    }
}
