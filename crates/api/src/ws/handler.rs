use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use whaileys_core::types::DbId;

use crate::gate::RequestContext;
use crate::state::AppState;
use crate::ws::relay::Relay;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The live channel is public; a resolved identity is only kept for logs.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ctx: RequestContext,
) -> impl IntoResponse {
    let user_id = ctx.caller.map(|c| c.user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state.relay, user_id))
}

/// Manage a single connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the relay.
///   2. Spawns a sender task that drains the relay channel in order.
///   3. Applies subscribe/unsubscribe requests on the current task.
///   4. Removes the connection (and its subscriptions) on disconnect.
async fn handle_socket(socket: WebSocket, relay: Arc<Relay>, user_id: Option<DbId>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, ?user_id, "Live connection opened");

    let mut rx = relay.register(conn_id.clone(), user_id).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "Live connection sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                relay.apply_client_text(&conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "Live connection receive error");
                break;
            }
        }
    }

    relay.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Live connection closed");
}
