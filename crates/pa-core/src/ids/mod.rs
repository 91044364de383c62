//! ID type wrappers for type safety.

mod id_macro;
pub mod lobby_id;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

pub use lobby_id::LobbyId;

/// Identifier of a `UserPair` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

/// Identifier of a `UserSession` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl_id!(PairId, SessionId);
