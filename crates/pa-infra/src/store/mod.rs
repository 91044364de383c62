//! Relational store adapters for `user_sessions` / `user_pairs`.

mod memory;
mod postgrest;
mod rows;

pub use memory::InMemoryPairingStore;
pub use postgrest::PostgrestPairingStore;
