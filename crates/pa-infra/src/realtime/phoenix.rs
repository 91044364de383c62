//! Phoenix channel frames (`vsn=1.0.0` JSON serializer) as spoken by the
//! realtime websocket.

use pa_core::pairing::Topic;
use pa_core::ports::{RealtimeError, RealtimeMessage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const CHANNEL_PREFIX: &str = "realtime";
const PHOENIX_TOPIC: &str = "phoenix";

const EVENT_JOIN: &str = "phx_join";
const EVENT_LEAVE: &str = "phx_leave";
const EVENT_HEARTBEAT: &str = "heartbeat";
const EVENT_BROADCAST: &str = "broadcast";
const EVENT_CLOSE: &str = "phx_close";
const EVENT_ERROR: &str = "phx_error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PhoenixFrame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Inbound {
    Broadcast(RealtimeMessage),
    /// The server closed or errored the channel.
    ChannelClosed(String),
    /// Replies, presence, heartbeat acks.
    Other,
}

pub(crate) fn channel_topic(topic: &Topic) -> String {
    format!("{CHANNEL_PREFIX}:{topic}")
}

pub(crate) fn join(topic: &Topic, reference: u64) -> PhoenixFrame {
    PhoenixFrame {
        topic: channel_topic(topic),
        event: EVENT_JOIN.to_string(),
        payload: json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" }
            }
        }),
        reference: Some(reference.to_string()),
    }
}

pub(crate) fn leave(topic: &Topic, reference: u64) -> PhoenixFrame {
    PhoenixFrame {
        topic: channel_topic(topic),
        event: EVENT_LEAVE.to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
    }
}

pub(crate) fn heartbeat(reference: u64) -> PhoenixFrame {
    PhoenixFrame {
        topic: PHOENIX_TOPIC.to_string(),
        event: EVENT_HEARTBEAT.to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
    }
}

pub(crate) fn encode(frame: &PhoenixFrame) -> Result<String, RealtimeError> {
    serde_json::to_string(frame).map_err(|e| RealtimeError::Decode(e.to_string()))
}

/// Classify one text frame received on the socket joined to `topic`.
pub(crate) fn decode(text: &str, topic: &Topic) -> Result<Inbound, RealtimeError> {
    let frame: PhoenixFrame =
        serde_json::from_str(text).map_err(|e| RealtimeError::Decode(format!("{e}: {text}")))?;

    if frame.topic != channel_topic(topic) {
        return Ok(Inbound::Other);
    }

    match frame.event.as_str() {
        EVENT_BROADCAST => {
            let event = frame
                .payload
                .get("event")
                .and_then(Value::as_str)
                .ok_or_else(|| RealtimeError::Decode("broadcast without event".to_string()))?;
            let payload = frame.payload.get("payload").cloned().unwrap_or(Value::Null);
            Ok(Inbound::Broadcast(RealtimeMessage::new(topic, event, payload)))
        }
        EVENT_CLOSE | EVENT_ERROR => Ok(Inbound::ChannelClosed(frame.event)),
        _ => Ok(Inbound::Other),
    }
}
