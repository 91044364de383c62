use anyhow::Result;

use crate::code::UserCode;
use crate::ids::LobbyId;

/// Where a paired listener sends the user. The UI (or CLI) decides what
/// "navigate" means.
#[async_trait::async_trait]
pub trait LobbyNavigatorPort: Send + Sync {
    async fn navigate_to_lobby(&self, lobby_id: &LobbyId, partner_code: &UserCode) -> Result<()>;
}
