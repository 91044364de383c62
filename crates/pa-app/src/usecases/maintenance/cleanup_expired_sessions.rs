use std::sync::Arc;

use pa_core::ports::{ClockPort, PairingBackendPort};
use tracing::{error, info};

/// Housekeeping: drop backend sessions past their expiry. Meant to be run
/// periodically; failures are logged, never raised.
pub struct CleanupExpiredSessions {
    backend: Arc<dyn PairingBackendPort>,
    clock: Arc<dyn ClockPort>,
}

impl CleanupExpiredSessions {
    pub fn new(backend: Arc<dyn PairingBackendPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { backend, clock }
    }

    /// Number of sessions removed (0 on failure).
    #[tracing::instrument(name = "usecase.cleanup_expired_sessions.execute", skip(self))]
    pub async fn execute(&self) -> u64 {
        match self
            .backend
            .cleanup_expired_sessions(self.clock.now_utc())
            .await
        {
            Ok(removed) => {
                info!(removed, "expired sessions cleaned up");
                removed
            }
            Err(e) => {
                error!(error = %e, "failed to clean up expired sessions");
                0
            }
        }
    }
}
