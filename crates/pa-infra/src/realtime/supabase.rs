use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use pa_core::pairing::Topic;
use pa_core::ports::{RealtimeError, RealtimeMessage, RealtimePort, RealtimeSubscription, Subscription};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use super::phoenix::{self, Inbound};
use super::SUBSCRIPTION_BUFFER;

const PROTOCOL_VERSION: &str = "1.0.0";
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Hosted realtime broadcast channels.
///
/// Publishing goes through the REST broadcast endpoint, so it needs no
/// socket. Each subscription opens its own websocket, joins
/// `realtime:<topic>` and keeps it alive with Phoenix heartbeats.
pub struct SupabaseRealtime {
    client: reqwest::Client,
    broadcast_url: Url,
    socket_url: Url,
    anon_key: String,
}

impl SupabaseRealtime {
    pub fn new(backend_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, RealtimeError> {
        let mut base = Url::parse(backend_url.trim()).map_err(|e| {
            RealtimeError::Connection(format!("invalid backend url {backend_url:?}: {e}"))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let broadcast_url = base
            .join("realtime/v1/api/broadcast")
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;

        let mut socket_url = base
            .join("realtime/v1/websocket")
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;
        let ws_scheme = if socket_url.scheme() == "https" { "wss" } else { "ws" };
        socket_url
            .set_scheme(ws_scheme)
            .map_err(|_| RealtimeError::Connection(format!("cannot derive socket url from {base}")))?;
        socket_url
            .query_pairs_mut()
            .append_pair("apikey", anon_key)
            .append_pair("vsn", PROTOCOL_VERSION);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            broadcast_url,
            socket_url,
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait]
impl RealtimePort for SupabaseRealtime {
    async fn publish(&self, message: RealtimeMessage) -> Result<(), RealtimeError> {
        let body = json!({
            "messages": [{
                "topic": message.topic,
                "event": message.event,
                "payload": message.payload,
            }]
        });

        let response = self
            .client
            .post(self.broadcast_url.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RealtimeError::Publish(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RealtimeError::Publish(format!("{status}: {text}")));
        }
        debug!(topic = %message.topic, event = %message.event, "broadcast published");
        Ok(())
    }

    async fn subscribe(&self, topic: &Topic) -> Result<RealtimeSubscription, RealtimeError> {
        let (socket, _response) = tokio_tungstenite::connect_async(self.socket_url.as_str())
            .await
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;
        let (mut write, mut read) = socket.split();

        let join = phoenix::encode(&phoenix::join(topic, 1))?;
        write
            .send(Message::Text(join))
            .await
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;
        info!(%topic, "realtime channel joined");

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let channel = topic.clone();

        tokio::spawn(async move {
            let mut next_ref: u64 = 2;
            let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
            heartbeat.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        if let Ok(leave) = phoenix::encode(&phoenix::leave(&channel, next_ref)) {
                            let _ = write.send(Message::Text(leave)).await;
                        }
                        let _ = write.close().await;
                        debug!(topic = %channel, "realtime channel left");
                        break;
                    }
                    _ = heartbeat.tick() => {
                        let Ok(frame) = phoenix::encode(&phoenix::heartbeat(next_ref)) else {
                            continue;
                        };
                        next_ref += 1;
                        if let Err(e) = write.send(Message::Text(frame)).await {
                            warn!(topic = %channel, error = %e, "heartbeat failed, dropping channel");
                            break;
                        }
                    }
                    incoming = read.next() => match incoming {
                        Some(Ok(Message::Text(text))) => match phoenix::decode(&text, &channel) {
                            Ok(Inbound::Broadcast(message)) => {
                                if tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Ok(Inbound::ChannelClosed(reason)) => {
                                warn!(topic = %channel, %reason, "realtime channel closed by server");
                                break;
                            }
                            Ok(Inbound::Other) => {}
                            Err(e) => warn!(topic = %channel, error = %e, "skipping malformed frame"),
                        },
                        Some(Ok(Message::Close(frame))) => {
                            debug!(topic = %channel, ?frame, "realtime socket closed");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(topic = %channel, error = %e, "realtime socket error");
                            break;
                        }
                        None => break,
                    }
                }
            }
        });

        Ok(Subscription::new(topic.as_str(), rx, move || {
            let _ = stop_tx.send(());
        }))
    }
}
