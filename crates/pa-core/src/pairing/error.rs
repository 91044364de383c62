use serde::Serialize;
use thiserror::Error;

/// Failures of a pairing attempt.
///
/// Every variant renders a message that can be shown next to the partner
/// code input as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
pub enum PairingError {
    #[error("That doesn't look like a pairing code. Codes look like ABC-DEF-234.")]
    InvalidFormat,

    #[error("You cannot pair with yourself!")]
    SelfPairing,

    #[error("Partner code not found. Please check and try again.")]
    PartnerNotFound,

    #[error("Partner is already in a game. Please try again later.")]
    PartnerBusy,

    #[error("You are already paired with someone else.")]
    AlreadyPaired,

    /// Backend or compensation failure.
    #[error("Pairing failed. Please try again.")]
    PairingFailed,
}

/// Failures when entering a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("No user code found. Please return to home.")]
    NoUserCode,

    #[error("Lobby not found. It may have expired.")]
    LobbyNotFound,

    #[error("You are not part of this lobby.")]
    NotAMember,

    #[error("lobby lookup failed: {0}")]
    Backend(String),
}
