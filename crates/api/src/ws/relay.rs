use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use serde_json::{json, Value};
use tokio::sync::{mpsc, RwLock};
use whaileys_core::types::{DbId, Timestamp};

use super::protocol::{encode_event, events, ClientCommand, NotificationKind};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single live connection.
pub struct RelayConnection {
    /// Identity resolved at upgrade time, if any.
    pub user_id: Option<DbId>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Topics this connection currently receives.
    pub topics: HashSet<String>,
    pub connected_at: Timestamp,
}

/// Topic-based fan-out to browser connections.
///
/// One `RwLock` guards both the connection table and topic membership, so a
/// publish observes a consistent set of subscribers. Each connection drains
/// its own unbounded channel in order, which keeps delivery FIFO per
/// connection.
pub struct Relay {
    connections: RwLock<HashMap<String, RelayConnection>>,
}

impl Relay {
    /// Create a new, empty relay.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection with no subscriptions.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn register(
        &self,
        conn_id: String,
        user_id: Option<DbId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = RelayConnection {
            user_id,
            sender: tx,
            topics: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Drop a connection and all of its subscriptions.
    pub async fn remove(&self, conn_id: &str) -> bool {
        self.connections.write().await.remove(conn_id).is_some()
    }

    /// Join `topic`. Joining twice is a no-op. Returns `false` for an
    /// unknown connection.
    pub async fn subscribe(&self, conn_id: &str, topic: &str) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.topics.insert(topic.to_string());
                true
            }
            None => false,
        }
    }

    /// Leave `topic`. Leaving a topic never joined is a no-op.
    pub async fn unsubscribe(&self, conn_id: &str, topic: &str) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.topics.remove(topic);
                true
            }
            None => false,
        }
    }

    /// Apply a text frame received from `conn_id`.
    ///
    /// Returns the command that was applied, or `None` when the frame was
    /// not a recognised subscribe/unsubscribe request.
    pub async fn apply_client_text(&self, conn_id: &str, text: &str) -> Option<ClientCommand> {
        let command = ClientCommand::parse(text);
        match &command {
            Some(ClientCommand::Subscribe(topic)) => {
                self.subscribe(conn_id, topic).await;
                tracing::info!(conn_id, topic = %topic, "Subscribed");
            }
            Some(ClientCommand::Unsubscribe(topic)) => {
                self.unsubscribe(conn_id, topic).await;
                tracing::info!(conn_id, topic = %topic, "Unsubscribed");
            }
            None => tracing::debug!(conn_id, "Ignoring unrecognised client message"),
        }
        command
    }

    /// Send `event` to every subscriber of `topic`.
    ///
    /// A server `timestamp` is added to the payload. Delivery is
    /// best-effort: connections whose channel is closed are skipped and
    /// cleaned up by their own receive loop. Returns how many connections
    /// the event was queued for.
    pub async fn publish(&self, topic: &str, event: &str, payload: Value) -> usize {
        let text = encode_event(event, payload, chrono::Utc::now());
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for conn in conns.values().filter(|c| c.topics.contains(topic)) {
            if conn.sender.send(Message::Text(text.clone().into())).is_ok() {
                delivered += 1;
            }
        }
        tracing::debug!(topic, event, delivered, "Relay publish");
        delivered
    }

    /// Send a `notification` event to every connection, subscribed or not.
    pub async fn notify_all(&self, message: &str, kind: NotificationKind) -> usize {
        let text = encode_event(
            events::NOTIFICATION,
            json!({ "message": message, "type": kind }),
            chrono::Utc::now(),
        );
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for conn in conns.values() {
            if conn.sender.send(Message::Text(text.clone().into())).is_ok() {
                delivered += 1;
            }
        }
        tracing::debug!(delivered, ?kind, "Relay notification");
        delivered
    }

    /// Return the current number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Return how many connections are subscribed to `topic`.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|c| c.topics.contains(topic))
            .count()
    }

    /// Send a Close frame to every connection, then clear the table.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all live connections");
    }

    /// Send a Ping frame to every connection.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
