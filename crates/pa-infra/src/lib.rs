//! Infrastructure adapters implementing the `pa-core` ports.

pub mod pairing;
pub mod realtime;
pub mod state;
pub mod store;
pub mod time;

pub use pairing::{LivePairingBackend, MockPairingBackend};
pub use realtime::{LocalRealtimeHub, SupabaseRealtime};
pub use state::{FileLocalStateStore, InMemoryLocalStateStore};
pub use store::{InMemoryPairingStore, PostgrestPairingStore};
pub use time::SystemClock;
