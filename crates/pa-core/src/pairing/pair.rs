use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::code::UserCode;
use crate::ids::{LobbyId, PairId};
use crate::pairing::PairingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    Active,
    InGame,
    Completed,
}

impl PairStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InGame => "in_game",
            Self::Completed => "completed",
        }
    }
}

/// Two codes linked into one lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPair {
    pub id: PairId,
    pub user_a_code: UserCode,
    pub user_b_code: UserCode,
    pub lobby_id: LobbyId,
    pub status: PairStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UserPair {
    pub fn involves(&self, code: &UserCode) -> bool {
        self.user_a_code == *code || self.user_b_code == *code
    }

    /// The other member, or `None` when `code` is not part of this pair.
    pub fn partner_of(&self, code: &UserCode) -> Option<&UserCode> {
        if self.user_a_code == *code {
            Some(&self.user_b_code)
        } else if self.user_b_code == *code {
            Some(&self.user_a_code)
        } else {
            None
        }
    }
}

/// A pair about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserPair {
    pub user_a_code: UserCode,
    pub user_b_code: UserCode,
    pub lobby_id: LobbyId,
    pub status: PairStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewUserPair {
    /// An `active` pair. Refuses to link a code with itself.
    pub fn active(
        user_a_code: UserCode,
        user_b_code: UserCode,
        lobby_id: LobbyId,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, PairingError> {
        if user_a_code == user_b_code {
            return Err(PairingError::SelfPairing);
        }
        Ok(Self {
            user_a_code,
            user_b_code,
            lobby_id,
            status: PairStatus::Active,
            created_at,
            expires_at,
        })
    }

    pub fn into_pair(self, id: PairId) -> UserPair {
        UserPair {
            id,
            user_a_code: self.user_a_code,
            user_b_code: self.user_b_code,
            lobby_id: self.lobby_id,
            status: self.status,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
