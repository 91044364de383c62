use std::collections::HashMap;

use async_trait::async_trait;
use pa_core::pairing::Topic;
use pa_core::ports::{RealtimeError, RealtimeMessage, RealtimePort, RealtimeSubscription, Subscription};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, warn};

use super::SUBSCRIPTION_BUFFER;

const TOPIC_CAPACITY: usize = 64;

/// In-process broadcast bus. Every handle cloned from the same `Arc` sees
/// the same topics, so two participants in one process can pair through it.
///
/// A topic exists only while it has receivers; entries whose last receiver
/// is gone are pruned on the next publish or subscribe.
#[derive(Default)]
pub struct LocalRealtimeHub {
    topics: Mutex<Topics>,
}

type Topics = HashMap<String, broadcast::Sender<RealtimeMessage>>;

fn prune(topics: &mut Topics) {
    topics.retain(|_, sender| sender.receiver_count() > 0);
}

impl LocalRealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RealtimePort for LocalRealtimeHub {
    async fn publish(&self, message: RealtimeMessage) -> Result<(), RealtimeError> {
        let mut topics = self.topics.lock().await;
        prune(&mut topics);
        // No subscribers is not an error: broadcast is fire-and-forget.
        let delivered = topics
            .get(&message.topic)
            .map(|sender| sender.send(message).unwrap_or(0))
            .unwrap_or(0);
        debug!(delivered, "local realtime publish");
        Ok(())
    }

    async fn subscribe(&self, topic: &Topic) -> Result<RealtimeSubscription, RealtimeError> {
        let mut source = {
            let mut topics = self.topics.lock().await;
            prune(&mut topics);
            topics
                .entry(topic.as_str().to_string())
                .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
                .subscribe()
        };
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let topic_name = topic.as_str().to_string();

        let forward = tokio::spawn(async move {
            loop {
                match source.recv().await {
                    Ok(message) => {
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(topic = %topic_name, skipped, "local subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(topic.as_str(), rx, move || forward.abort()))
    }
}
