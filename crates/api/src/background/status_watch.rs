//! Session status watcher.
//!
//! The external API has no push channel, so this task polls the session
//! list and turns observed differences into relay events:
//!
//! - status change -> `session:status_changed {sessionId, status}` plus a
//!   `notification` for connects and disconnects
//! - session not seen before -> `session:update` with the full record
//!
//! The first successful poll only records the baseline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use whaileys_client::{SessionApi, WhaileysApiError};
use whaileys_core::session::SessionStatus;

use crate::ws::protocol::{events, NotificationKind, SESSIONS_TOPIC};
use crate::ws::Relay;

/// Diffs consecutive session listings.
pub struct StatusWatcher {
    api: Arc<dyn SessionApi>,
    relay: Arc<Relay>,
    /// Last reported status per session id. `None` until the first poll.
    last_seen: Option<HashMap<String, String>>,
}

impl StatusWatcher {
    pub fn new(api: Arc<dyn SessionApi>, relay: Arc<Relay>) -> Self {
        Self {
            api,
            relay,
            last_seen: None,
        }
    }

    /// Fetch the list once and publish what changed. Returns the number of
    /// session events published.
    pub async fn poll_once(&mut self) -> Result<usize, WhaileysApiError> {
        let records = self.api.list_sessions().await?;
        let current: HashMap<String, String> = records
            .iter()
            .map(|r| (r.session_id.clone(), r.status.clone()))
            .collect();

        let Some(previous) = self.last_seen.replace(current) else {
            tracing::debug!(count = records.len(), "Status watcher baseline recorded");
            return Ok(0);
        };

        let mut published = 0;
        for record in &records {
            match previous.get(&record.session_id) {
                Some(old) if *old != record.status => {
                    tracing::info!(
                        session_id = %record.session_id,
                        from = %old,
                        to = %record.status,
                        "Session status changed"
                    );
                    self.relay
                        .publish(
                            SESSIONS_TOPIC,
                            events::SESSION_STATUS_CHANGED,
                            json!({ "sessionId": record.session_id, "status": record.status }),
                        )
                        .await;
                    self.notify_transition(&record.session_id, record.known_status())
                        .await;
                    published += 1;
                }
                Some(_) => {}
                None => {
                    let payload = serde_json::to_value(record).unwrap_or_default();
                    self.relay
                        .publish(SESSIONS_TOPIC, events::SESSION_UPDATE, payload)
                        .await;
                    published += 1;
                }
            }
        }
        Ok(published)
    }

    async fn notify_transition(&self, session_id: &str, status: Option<SessionStatus>) {
        let (message, kind) = match status {
            Some(SessionStatus::Connected) => (
                format!("Sessão {session_id} conectada"),
                NotificationKind::Success,
            ),
            Some(SessionStatus::Disconnected) => (
                format!("Sessão {session_id} desconectada"),
                NotificationKind::Warning,
            ),
            _ => return,
        };
        self.relay.notify_all(&message, kind).await;
    }
}

/// Run the watcher loop until `cancel` is triggered.
pub async fn run(
    api: Arc<dyn SessionApi>,
    relay: Arc<Relay>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Status watcher started");

    let mut watcher = StatusWatcher::new(api, relay);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Status watcher stopping");
                break;
            }
            _ = ticker.tick() => {
                match watcher.poll_once().await {
                    Ok(0) => {}
                    Ok(published) => tracing::debug!(published, "Status watcher published events"),
                    Err(e) => tracing::warn!(error = %e, "Status watcher poll failed"),
                }
            }
        }
    }
}
