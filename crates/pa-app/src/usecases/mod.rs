//! Business logic use cases
//!
//! [EnsureUserCode] → code shown to the user
//!         ↓
//! [InitiatePartnerPairing] (initiator)  /  [PairingListener] (target)
//!         ↓
//! [EnterLobby] → [JoinGameRoom]

pub mod code;
pub mod game;
pub mod lobby;
pub mod maintenance;
pub mod pairing;

#[cfg(test)]
pub(crate) mod test_support;

pub use code::EnsureUserCode;
pub use game::{GameRoom, JoinGameRoom};
pub use lobby::{CurrentLobby, EnterLobby};
pub use maintenance::CleanupExpiredSessions;
pub use pairing::{InitiatePartnerPairing, PairingListener, PairingListenerHandle};
