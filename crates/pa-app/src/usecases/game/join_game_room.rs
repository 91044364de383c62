use std::sync::Arc;

use pa_core::pairing::{Topic, GAME_STATE_EVENT};
use pa_core::ports::{RealtimeError, RealtimeMessage, RealtimePort, RealtimeSubscription};
use serde_json::Value;
use tracing::{debug, info};

/// Attach to the `game:<roomId>` broadcast channel. Game state is opaque
/// JSON; this layer only relays it.
pub struct JoinGameRoom {
    realtime: Arc<dyn RealtimePort>,
}

impl JoinGameRoom {
    pub fn new(realtime: Arc<dyn RealtimePort>) -> Self {
        Self { realtime }
    }

    #[tracing::instrument(name = "usecase.join_game_room.execute", skip(self))]
    pub async fn execute(&self, room_id: &str) -> Result<GameRoom, RealtimeError> {
        let topic = Topic::game(room_id);
        let subscription = self.realtime.subscribe(&topic).await?;
        info!(%topic, "joined game room");
        Ok(GameRoom {
            topic,
            realtime: self.realtime.clone(),
            subscription,
            last_state: None,
        })
    }
}

/// A joined game channel. Dropping it leaves the channel.
pub struct GameRoom {
    topic: Topic,
    realtime: Arc<dyn RealtimePort>,
    subscription: RealtimeSubscription,
    last_state: Option<Value>,
}

impl GameRoom {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Most recent state received from the other side.
    pub fn last_state(&self) -> Option<&Value> {
        self.last_state.as_ref()
    }

    /// Wait for the next `game-state` broadcast. `None` once the channel
    /// is gone.
    pub async fn next_state(&mut self) -> Option<Value> {
        while let Some(message) = self.subscription.recv().await {
            if message.event != GAME_STATE_EVENT {
                debug!(event = %message.event, "ignoring non game-state event");
                continue;
            }
            self.last_state = Some(message.payload.clone());
            return Some(message.payload);
        }
        None
    }

    pub async fn send_move(&self, payload: Value) -> Result<(), RealtimeError> {
        self.realtime
            .publish(RealtimeMessage::new(&self.topic, GAME_STATE_EVENT, payload))
            .await
    }

    pub fn leave(self) {
        self.subscription.unsubscribe();
    }
}
