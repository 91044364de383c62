use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::code::UserCode;
use crate::ids::{PairId, SessionId};

/// A participant known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub id: SessionId,
    pub code: UserCode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_paired: bool,
    pub pair_id: Option<PairId>,
}

impl UserSession {
    /// Fresh, unpaired session for `code` living for `ttl`.
    pub fn new(code: UserCode, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: SessionId::new(),
            code,
            created_at,
            expires_at: created_at + ttl,
            is_paired: false,
            pair_id: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn mark_paired(&mut self, pair_id: PairId) {
        self.is_paired = true;
        self.pair_id = Some(pair_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_unpaired_and_expires_after_ttl() {
        let now = Utc::now();
        let mut session = UserSession::new(
            UserCode::parse("ABC-234-XYZ").unwrap(),
            now,
            Duration::hours(1),
        );
        assert!(!session.is_paired);
        assert!(!session.is_expired(now + Duration::minutes(59)));
        assert!(session.is_expired(now + Duration::minutes(61)));

        let pair_id = PairId::new();
        session.mark_paired(pair_id.clone());
        assert!(session.is_paired);
        assert_eq!(session.pair_id, Some(pair_id));
    }
}
