use async_trait::async_trait;

use super::errors::LocalStateError;

/// Keys of the persisted client state.
pub mod keys {
    pub const USER_CODE: &str = "userCode";
    pub const USER_CODE_TIMESTAMP: &str = "userCodeTimestamp";
    pub const PARTNER_CODE: &str = "partnerCode";
    pub const CURRENT_LOBBY: &str = "currentLobby";
    pub const MOCK_PAIRING: &str = "mockPairing";
}

/// Device-local persistent key/value storage (string values).
#[async_trait]
pub trait LocalStatePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStateError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStateError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), LocalStateError>;
}
