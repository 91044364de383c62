//! Pairing domain models, error taxonomy and the listener state machine.

pub mod error;
pub mod event;
pub mod listener;
pub mod lobby;
pub mod pair;
pub mod result;
pub mod session;
pub mod topic;

pub use error::{LobbyError, PairingError};
pub use event::{MockPairingRecord, MockRecordRole, PairingEvent, GAME_STATE_EVENT, PAIRED_EVENT};
pub use listener::{ListenerDecision, ListenerEvent, ListenerMachine, ListenerState};
pub use lobby::{LobbyRole, LobbySession};
pub use pair::{NewUserPair, PairStatus, UserPair};
pub use result::PairingResult;
pub use session::UserSession;
pub use topic::Topic;
