use serde::{Deserialize, Serialize};

use crate::code::UserCode;
use crate::ids::LobbyId;

/// Event name carried on `pairing:<code>` topics.
pub const PAIRED_EVENT: &str = "paired";

/// Event name carried on `game:<roomId>` topics.
pub const GAME_STATE_EVENT: &str = "game-state";

/// Notification addressed to the pairing target.
///
/// `partner_code` is the *initiator's* code, as seen from the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingEvent {
    pub lobby_id: LobbyId,
    pub partner_code: UserCode,
}

/// The single shared record the mock backend uses in place of a realtime
/// channel. Stored as JSON under the `mockPairing` local key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockPairingRecord {
    pub my_code: UserCode,
    pub partner_code: UserCode,
    pub lobby_id: LobbyId,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockRecordRole {
    /// The record was written for us: consume it.
    Target,
    /// We wrote the record and are waiting for the partner.
    Initiator,
    Unrelated,
}

impl MockPairingRecord {
    pub fn role_of(&self, code: &UserCode) -> MockRecordRole {
        if self.partner_code == *code {
            MockRecordRole::Target
        } else if self.my_code == *code {
            MockRecordRole::Initiator
        } else {
            MockRecordRole::Unrelated
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }

    pub fn is_stale(&self, now_ms: i64, stale_after_ms: i64) -> bool {
        self.age_ms(now_ms) > stale_after_ms
    }

    /// The event as delivered to the target.
    pub fn to_event(&self) -> PairingEvent {
        PairingEvent {
            lobby_id: self.lobby_id.clone(),
            partner_code: self.my_code.clone(),
        }
    }
}
