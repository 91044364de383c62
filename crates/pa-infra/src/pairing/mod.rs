//! The two `PairingBackendPort` implementations.

mod live_backend;
mod mock_backend;

pub use live_backend::LivePairingBackend;
pub use mock_backend::MockPairingBackend;
