//! Event names and frame shapes of the live channel.
//!
//! Server to client: text frames `{"event": <name>, "data": {..., "timestamp"}}`.
//! Client to server: `{"event": "subscribe:sessions"}` or the bare event name.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use whaileys_core::types::Timestamp;

/// Topic carrying session lifecycle events.
pub const SESSIONS_TOPIC: &str = "sessions";

/// Topics a client may join.
pub const KNOWN_TOPICS: &[&str] = &[SESSIONS_TOPIC];

pub mod events {
    pub const SESSION_CREATED: &str = "session:created";
    pub const SESSION_DELETED: &str = "session:deleted";
    pub const SESSION_STATUS_CHANGED: &str = "session:status_changed";
    pub const SESSION_UPDATE: &str = "session:update";
    pub const NOTIFICATION: &str = "notification";
}

/// Severity of a `notification` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A request sent by a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Subscribe(String),
    Unsubscribe(String),
}

#[derive(Deserialize)]
struct ClientFrame {
    event: String,
}

impl ClientCommand {
    /// Parse an inbound text frame. Unknown events and topics yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let event = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame.event,
            Err(_) => text.to_string(),
        };

        let (verb, topic) = event.split_once(':')?;
        if !KNOWN_TOPICS.contains(&topic) {
            return None;
        }
        match verb {
            "subscribe" => Some(Self::Subscribe(topic.to_string())),
            "unsubscribe" => Some(Self::Unsubscribe(topic.to_string())),
            _ => None,
        }
    }
}

/// Serialize an outbound event, stamping `timestamp` into the payload.
///
/// Object payloads are extended in place; anything else is wrapped under
/// `value`.
pub fn encode_event(event: &str, payload: Value, at: Timestamp) -> String {
    let timestamp = Value::String(at.to_rfc3339());
    let data = match payload {
        Value::Object(mut map) => {
            map.insert("timestamp".to_string(), timestamp);
            Value::Object(map)
        }
        Value::Null => json!({ "timestamp": timestamp }),
        other => json!({ "value": other, "timestamp": timestamp }),
    };
    json!({ "event": event, "data": data }).to_string()
}
