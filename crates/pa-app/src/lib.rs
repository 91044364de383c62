//! pair-arcade application layer
//!
//! Use cases of the pairing flow, written against the `pa-core` ports only.
//! Which backend is behind those ports is decided by the caller.

pub mod usecases;

pub use usecases::{
    CleanupExpiredSessions, CurrentLobby, EnsureUserCode, EnterLobby, GameRoom,
    InitiatePartnerPairing, JoinGameRoom, PairingListener, PairingListenerHandle,
};
