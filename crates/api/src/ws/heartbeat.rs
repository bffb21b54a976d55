use std::sync::Arc;
use std::time::Duration;

use crate::ws::relay::Relay;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every live connection.
///
/// The task runs until aborted through the returned handle.
pub fn start_heartbeat(relay: Arc<Relay>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = relay.connection_count().await;
            tracing::debug!(count, "Live channel heartbeat ping");
            relay.ping_all().await;
        }
    })
}
