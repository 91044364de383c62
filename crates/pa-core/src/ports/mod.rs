//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and infrastructure
//! implementations (hexagonal architecture). The pairing flow only ever sees
//! these traits; which backend sits behind them is decided once at startup.

mod clock;
pub mod errors;
pub mod local_state;
mod navigator;
pub mod pairing_backend;
pub mod pairing_store;
pub mod realtime;
mod subscription;

pub use clock::*;
pub use errors::{BackendError, LocalStateError, RealtimeError, StoreError};
pub use local_state::LocalStatePort;
pub use navigator::LobbyNavigatorPort;
pub use pairing_backend::{BackendMode, PairingBackendPort, PairingSubscription};
pub use pairing_store::PairingStorePort;
pub use realtime::{RealtimeMessage, RealtimePort, RealtimeSubscription};
pub use subscription::Subscription;
