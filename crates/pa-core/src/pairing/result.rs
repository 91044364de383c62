use serde::{Serialize, Serializer};

use crate::ids::LobbyId;
use crate::pairing::PairingError;

/// Outcome of one pairing attempt as handed back to the caller.
///
/// Serializes to `{ success, lobbyId?, error? }` with `error` as the
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lobby_id: Option<LobbyId>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error_message"
    )]
    pub error: Option<PairingError>,
}

impl PairingResult {
    pub fn succeeded(lobby_id: LobbyId) -> Self {
        Self {
            success: true,
            lobby_id: Some(lobby_id),
            error: None,
        }
    }

    pub fn failed(error: PairingError) -> Self {
        Self {
            success: false,
            lobby_id: None,
            error: Some(error),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }
}

impl From<Result<LobbyId, PairingError>> for PairingResult {
    fn from(outcome: Result<LobbyId, PairingError>) -> Self {
        match outcome {
            Ok(lobby_id) => Self::succeeded(lobby_id),
            Err(error) => Self::failed(error),
        }
    }
}

fn serialize_error_message<S: Serializer>(
    error: &Option<PairingError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
