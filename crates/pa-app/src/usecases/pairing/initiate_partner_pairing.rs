use std::sync::Arc;

use pa_core::code;
use pa_core::config::PairingTuning;
use pa_core::ids::LobbyId;
use pa_core::pairing::{NewUserPair, PairingError, PairingEvent, PairingResult};
use pa_core::ports::local_state::keys;
use pa_core::ports::{BackendError, ClockPort, LocalStatePort, PairingBackendPort};
use pa_core::UserCode;
use tracing::{error, info, warn};

/// Link the caller with a partner code and tell the partner about it.
///
/// Runs strictly in order: validate, check both sessions, create the pair
/// (commit point), mark both sessions, notify. A failed session update
/// deletes the pair again. Nothing here retries.
///
/// Two initiators racing for the same free partner can both pass the
/// availability check; the store has no constraint that stops the second
/// pair.
pub struct InitiatePartnerPairing {
    backend: Arc<dyn PairingBackendPort>,
    local_state: Arc<dyn LocalStatePort>,
    clock: Arc<dyn ClockPort>,
    pair_ttl: chrono::Duration,
}

impl InitiatePartnerPairing {
    pub fn new(
        backend: Arc<dyn PairingBackendPort>,
        local_state: Arc<dyn LocalStatePort>,
        clock: Arc<dyn ClockPort>,
        tuning: &PairingTuning,
    ) -> Self {
        Self {
            backend,
            local_state,
            clock,
            pair_ttl: tuning.session_ttl(),
        }
    }

    /// Never fails: every error is folded into the returned result.
    #[tracing::instrument(
        name = "usecase.initiate_partner_pairing.execute",
        skip(self),
        fields(my_code = %my_code)
    )]
    pub async fn execute(&self, my_code: &UserCode, partner_input: &str) -> PairingResult {
        let outcome = self.pair(my_code, partner_input).await;
        match &outcome {
            Ok(lobby_id) => info!(lobby_id = %lobby_id, "pairing succeeded"),
            Err(e) => warn!(error = ?e, "pairing rejected: {e}"),
        }
        outcome.into()
    }

    async fn pair(&self, my_code: &UserCode, partner_input: &str) -> Result<LobbyId, PairingError> {
        if my_code.as_str() == partner_input {
            return Err(PairingError::SelfPairing);
        }

        let partner = code::normalize(partner_input).ok_or(PairingError::InvalidFormat)?;
        if partner == *my_code {
            return Err(PairingError::SelfPairing);
        }

        // A failed lookup reads the same as a missing session.
        let partner_session = match self.backend.find_session(&partner).await {
            Ok(session) => session.ok_or(PairingError::PartnerNotFound)?,
            Err(e) => {
                warn!(%partner, error = %e, "partner lookup failed");
                return Err(PairingError::PartnerNotFound);
            }
        };
        if partner_session.is_paired {
            return Err(PairingError::PartnerBusy);
        }

        // Our own session is optional; only an explicit pairing blocks.
        match self.backend.find_session(my_code).await {
            Ok(Some(mine)) if mine.is_paired => return Err(PairingError::AlreadyPaired),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "own session lookup failed, continuing"),
        }

        let now = self.clock.now_utc();
        let lobby_id = LobbyId::mint(self.clock.now_ms());
        let new_pair = NewUserPair::active(
            my_code.clone(),
            partner.clone(),
            lobby_id.clone(),
            now,
            now + self.pair_ttl,
        )?;

        let pair = self
            .backend
            .create_pair(new_pair)
            .await
            .map_err(|e| backend_failure("create pair", e))?;

        if let Err(e) = self
            .backend
            .mark_paired(&[my_code.clone(), partner.clone()], &pair.id)
            .await
        {
            error!(pair_id = %pair.id, error = %e, "session update failed, rolling back pair");
            if let Err(rollback) = self.backend.rollback_pair(&pair.id).await {
                error!(pair_id = %pair.id, error = %rollback, "pair rollback failed");
            }
            return Err(PairingError::PairingFailed);
        }

        let event = PairingEvent {
            lobby_id: lobby_id.clone(),
            partner_code: my_code.clone(),
        };
        if let Err(e) = self.backend.notify_partner(&partner, &event).await {
            warn!(%partner, error = %e, "partner notification failed");
        }

        self.remember_lobby(&lobby_id, &partner).await;
        Ok(lobby_id)
    }

    async fn remember_lobby(&self, lobby_id: &LobbyId, partner: &UserCode) {
        if let Err(e) = self
            .local_state
            .set(keys::CURRENT_LOBBY, lobby_id.as_str())
            .await
        {
            warn!(error = %e, "failed to persist current lobby");
        }
        if let Err(e) = self.local_state.set(keys::PARTNER_CODE, partner.as_str()).await {
            warn!(error = %e, "failed to persist partner code");
        }
    }
}

fn backend_failure(step: &str, err: BackendError) -> PairingError {
    error!(step, error = %err, "pairing backend call failed");
    PairingError::PairingFailed
}
