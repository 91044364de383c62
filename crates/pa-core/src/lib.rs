//! # pa-core
//!
//! Core domain models and ports for the pair-arcade pairing subsystem.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod code;
pub mod config;
pub mod ids;
pub mod pairing;
pub mod ports;

// Re-export commonly used types at the crate root
pub use code::UserCode;
pub use config::AppConfig;
pub use ids::{LobbyId, PairId, SessionId};
pub use pairing::{
    LobbyError, LobbyRole, LobbySession, PairStatus, PairingError, PairingEvent, PairingResult,
    UserPair, UserSession,
};
