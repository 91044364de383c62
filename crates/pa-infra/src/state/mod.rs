//! Device-local key/value state (the browser `localStorage` equivalent).

mod file_store;
mod memory_store;

pub use file_store::FileLocalStateStore;
pub use memory_store::InMemoryLocalStateStore;
