//! Session command handlers.
//!
//! Each mutating command follows the same shape: validate, call the
//! external API, then on success record the activity and publish to the
//! relay, in that order, before returning. A failed external call has no
//! side effects here.

use std::sync::Arc;

use serde_json::json;
use whaileys_client::{SessionApi, SessionRecord, WhaileysApiError};
use whaileys_core::activity::{action_types, entity_types};
use whaileys_core::error::CoreError;
use whaileys_core::session::validate_session_id;

use crate::activity::{ActivityEntry, ActivitySink, RequestOrigin};
use crate::gate::Caller;
use crate::ws::protocol::{events, SESSIONS_TOPIC};
use crate::ws::Relay;

/// Operator-facing message for a delete the external API did not confirm.
pub const DELETE_FAILED_MSG: &str = "Falha ao deletar sessão";

/// Orchestrates the external API, the activity sink and the relay.
#[derive(Clone)]
pub struct SessionCommands {
    api: Arc<dyn SessionApi>,
    activity: Arc<dyn ActivitySink>,
    relay: Arc<Relay>,
}

impl SessionCommands {
    pub fn new(
        api: Arc<dyn SessionApi>,
        activity: Arc<dyn ActivitySink>,
        relay: Arc<Relay>,
    ) -> Self {
        Self {
            api,
            activity,
            relay,
        }
    }

    pub async fn list(&self) -> Result<Vec<SessionRecord>, CoreError> {
        self.api.list_sessions().await.map_err(upstream)
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionRecord, CoreError> {
        self.api
            .get_session(session_id)
            .await
            .map_err(upstream)?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Session",
                id: session_id.to_string(),
            })
    }

    /// Create a session under a caller-chosen identifier.
    pub async fn create(
        &self,
        caller: &Caller,
        origin: &RequestOrigin,
        raw_session_id: &str,
    ) -> Result<SessionRecord, CoreError> {
        let session_id = validate_session_id(raw_session_id)?;

        let record = self
            .api
            .create_session(&session_id)
            .await
            .map_err(upstream)?;

        tracing::info!(session_id = %session_id, user_id = caller.user_id, "Session created");

        self.activity
            .record(
                ActivityEntry::new(caller.user_id, action_types::CREATE_SESSION, origin)
                    .on_entity(entity_types::SESSION, session_id.as_str())
                    .with_details(json!({ "sessionId": session_id })),
            )
            .await;

        self.relay
            .publish(
                SESSIONS_TOPIC,
                events::SESSION_CREATED,
                json!({ "sessionId": session_id }),
            )
            .await;

        Ok(record)
    }

    /// Delete a session. Any upstream failure surfaces as
    /// [`DELETE_FAILED_MSG`].
    pub async fn delete(
        &self,
        caller: &Caller,
        origin: &RequestOrigin,
        session_id: &str,
    ) -> Result<(), CoreError> {
        if let Err(e) = self.api.delete_session(session_id).await {
            tracing::warn!(session_id, error = %e, "Session delete failed upstream");
            return Err(CoreError::Upstream(DELETE_FAILED_MSG.into()));
        }

        tracing::info!(session_id, user_id = caller.user_id, "Session deleted");

        self.activity
            .record(
                ActivityEntry::new(caller.user_id, action_types::DELETE_SESSION, origin)
                    .on_entity(entity_types::SESSION, session_id)
                    .with_details(json!({ "sessionId": session_id })),
            )
            .await;

        self.relay
            .publish(
                SESSIONS_TOPIC,
                events::SESSION_DELETED,
                json!({ "sessionId": session_id }),
            )
            .await;

        Ok(())
    }

    /// Current pairing QR code for a session.
    ///
    /// Uses the code embedded in the session record; a `connecting` session
    /// without one is asked through the dedicated QR endpoint. Unknown
    /// sessions and upstream failures yield `None`, since the dashboard
    /// simply polls again.
    pub async fn qr_code(&self, session_id: &str) -> Result<Option<String>, CoreError> {
        let record = match self.api.get_session(session_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "QR lookup failed");
                return Ok(None);
            }
        };

        if let Some(qr) = record.qr_code.clone().filter(|qr| !qr.is_empty()) {
            return Ok(Some(qr));
        }

        let awaits_pairing = record
            .known_status()
            .is_some_and(|status| status.awaits_pairing());
        if !awaits_pairing {
            return Ok(None);
        }

        match self.api.qr_code(session_id).await {
            Ok(qr) => Ok(qr.filter(|qr| !qr.is_empty())),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "QR endpoint failed");
                Ok(None)
            }
        }
    }

    /// Whether the external API answers its health probe.
    pub async fn health(&self) -> bool {
        match self.api.health().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "External API health probe failed");
                false
            }
        }
    }
}

fn upstream(err: WhaileysApiError) -> CoreError {
    CoreError::Upstream(err.to_string())
}
