use std::fmt;

use crate::code::UserCode;

const PAIRING_PREFIX: &str = "pairing";
const GAME_PREFIX: &str = "game";

/// Realtime channel name, e.g. `pairing:ABC-234-XYZ` or `game:<roomId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Channel on which `code` receives pairing notifications.
    pub fn pairing(code: &UserCode) -> Self {
        Self(format!("{PAIRING_PREFIX}:{code}"))
    }

    /// Channel carrying game state for one room.
    pub fn game(room_id: &str) -> Self {
        Self(format!("{GAME_PREFIX}:{room_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
