use std::collections::HashMap;

use async_trait::async_trait;
use pa_core::ports::{LocalStateError, LocalStatePort};
use tokio::sync::RwLock;

/// Process-local state; lost on exit. Shared by every handle cloned from
/// the same `Arc`, which is what lets two listeners on one device see the
/// same mock record.
#[derive(Default)]
pub struct InMemoryLocalStateStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStatePort for InMemoryLocalStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStateError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStateError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStateError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
