//! Wire shapes of the `user_sessions` / `user_pairs` tables (snake_case
//! columns, as the REST layer returns them).

use chrono::{DateTime, Utc};
use pa_core::ids::{LobbyId, PairId, SessionId};
use pa_core::pairing::{NewUserPair, PairStatus, UserPair, UserSession};
use pa_core::UserCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserSessionRow {
    pub id: String,
    pub user_code: UserCode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub is_paired: bool,
    pub pair_id: Option<String>,
}

impl From<UserSessionRow> for UserSession {
    fn from(row: UserSessionRow) -> Self {
        Self {
            id: SessionId::from(row.id),
            code: row.user_code,
            created_at: row.created_at,
            expires_at: row.expires_at,
            is_paired: row.is_paired,
            pair_id: row.pair_id.map(PairId::from),
        }
    }
}

impl From<&UserSession> for UserSessionRow {
    fn from(session: &UserSession) -> Self {
        Self {
            id: session.id.as_str().to_string(),
            user_code: session.code.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at,
            is_paired: session.is_paired,
            pair_id: session.pair_id.as_ref().map(|p| p.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserPairRow {
    pub id: String,
    pub user_a_code: UserCode,
    pub user_b_code: UserCode,
    pub lobby_id: String,
    pub status: PairStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<UserPairRow> for UserPair {
    fn from(row: UserPairRow) -> Self {
        Self {
            id: PairId::from(row.id),
            user_a_code: row.user_a_code,
            user_b_code: row.user_b_code,
            lobby_id: LobbyId::from(row.lobby_id),
            status: row.status,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Insert body for `user_pairs`; the id is assigned by the database.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewUserPairRow<'a> {
    pub user_a_code: &'a UserCode,
    pub user_b_code: &'a UserCode,
    pub lobby_id: &'a str,
    pub status: PairStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<'a> From<&'a NewUserPair> for NewUserPairRow<'a> {
    fn from(pair: &'a NewUserPair) -> Self {
        Self {
            user_a_code: &pair.user_a_code,
            user_b_code: &pair.user_b_code,
            lobby_id: pair.lobby_id.as_str(),
            status: pair.status,
            created_at: pair.created_at,
            expires_at: pair.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkPairedPatch<'a> {
    pub is_paired: bool,
    pub pair_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdOnlyRow {
    #[allow(dead_code)]
    pub id: String,
}
