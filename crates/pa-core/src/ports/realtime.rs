use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::RealtimeError;
use super::subscription::Subscription;
use crate::pairing::Topic;

/// One broadcast message on a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl RealtimeMessage {
    pub fn new(topic: &Topic, event: &str, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.as_str().to_string(),
            event: event.to_string(),
            payload,
        }
    }
}

pub type RealtimeSubscription = Subscription<RealtimeMessage>;

/// Publish/subscribe broadcast channel keyed by topic.
#[async_trait]
pub trait RealtimePort: Send + Sync {
    async fn publish(&self, message: RealtimeMessage) -> Result<(), RealtimeError>;

    /// Receive every message published to `topic` from now on.
    async fn subscribe(&self, topic: &Topic) -> Result<RealtimeSubscription, RealtimeError>;
}
