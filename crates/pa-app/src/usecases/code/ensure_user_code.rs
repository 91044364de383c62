use std::sync::Arc;

use anyhow::{Context, Result};
use pa_core::code;
use pa_core::config::PairingTuning;
use pa_core::pairing::UserSession;
use pa_core::ports::local_state::keys;
use pa_core::ports::{ClockPort, LocalStatePort, PairingBackendPort};
use pa_core::UserCode;
use tracing::{debug, info, warn};

/// The code this device shows to partners.
///
/// A stored code younger than the code TTL is reused; otherwise a new one
/// is generated, stored with its timestamp and registered with the backend.
pub struct EnsureUserCode {
    backend: Arc<dyn PairingBackendPort>,
    local_state: Arc<dyn LocalStatePort>,
    clock: Arc<dyn ClockPort>,
    code_ttl_ms: i64,
    session_ttl: chrono::Duration,
}

impl EnsureUserCode {
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
            code_ttl_ms: tuning.code_ttl_secs.saturating_mul(1_000),
            session_ttl: tuning.session_ttl(),
        }
    }

    #[tracing::instrument(name = "usecase.ensure_user_code.execute", skip(self))]
    pub async fn execute(&self) -> Result<UserCode> {
        let now_ms = self.clock.now_ms();
        if let Some(code) = self.reusable_code(now_ms).await? {
            debug!(%code, "reusing stored user code");
            return Ok(code);
        }

        let code = code::generate();
        self.local_state
            .set(keys::USER_CODE, code.as_str())
            .await
            .context("failed to store user code")?;
        self.local_state
            .set(keys::USER_CODE_TIMESTAMP, &now_ms.to_string())
            .await
            .context("failed to store user code timestamp")?;

        let session = UserSession::new(code.clone(), self.clock.now_utc(), self.session_ttl);
        if let Err(e) = self.backend.register_session(&session).await {
            warn!(%code, error = %e, "session registration failed, code only usable locally");
        }

        info!(%code, "issued new user code");
        Ok(code)
    }

    async fn reusable_code(&self, now_ms: i64) -> Result<Option<UserCode>> {
        let stored = self
            .local_state
            .get(keys::USER_CODE)
            .await
            .context("failed to read user code")?;
        let issued_at = self
            .local_state
            .get(keys::USER_CODE_TIMESTAMP)
            .await
            .context("failed to read user code timestamp")?;

        let (Some(stored), Some(issued_at)) = (stored, issued_at) else {
            return Ok(None);
        };
        let Ok(code) = UserCode::parse(&stored) else {
            return Ok(None);
        };
        let Ok(issued_at) = issued_at.trim().parse::<i64>() else {
            return Ok(None);
        };

        Ok((now_ms - issued_at < self.code_ttl_ms).then_some(code))
    }
}
