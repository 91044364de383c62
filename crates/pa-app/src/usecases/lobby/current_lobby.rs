use std::sync::Arc;

use anyhow::{Context, Result};
use pa_core::ids::LobbyId;
use pa_core::ports::local_state::keys;
use pa_core::ports::LocalStatePort;

/// The lobby this device last joined, if any.
pub struct CurrentLobby {
    local_state: Arc<dyn LocalStatePort>,
}

impl CurrentLobby {
    pub fn new(local_state: Arc<dyn LocalStatePort>) -> Self {
        Self { local_state }
    }

    pub async fn execute(&self) -> Result<Option<LobbyId>> {
        let stored = self
            .local_state
            .get(keys::CURRENT_LOBBY)
            .await
            .context("failed to read current lobby")?;
        Ok(stored
            .filter(|raw| !raw.trim().is_empty())
            .map(LobbyId::from))
    }
}
