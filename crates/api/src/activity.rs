//! Activity recording.
//!
//! Commands describe what happened as an [`ActivityEntry`] and hand it to an
//! [`ActivitySink`]. Recording is best-effort: a sink never fails the
//! command that produced the entry.

use async_trait::async_trait;
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use serde_json::Value;
use whaileys_core::activity::redact_sensitive_fields;
use whaileys_core::types::DbId;
use whaileys_db::models::activity_log::CreateActivityLog;
use whaileys_db::repositories::ActivityLogRepo;
use whaileys_db::DbPool;

/// Where a request came from, as far as proxies tell us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    /// Read the client address from `X-Forwarded-For` (first hop) or
    /// `X-Real-IP`, and the `User-Agent` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ip_address = header("x-forwarded-for")
            .and_then(|list| list.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .or_else(|| header("x-real-ip"))
            .map(str::to_string);

        Self {
            ip_address,
            user_agent: header(USER_AGENT.as_str()).map(str::to_string),
        }
    }
}

/// One thing an actor did.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub actor: DbId,
    pub action: &'static str,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<String>,
    pub details: Option<Value>,
    pub origin: RequestOrigin,
}

impl ActivityEntry {
    pub fn new(actor: DbId, action: &'static str, origin: &RequestOrigin) -> Self {
        Self {
            actor,
            action,
            entity_type: None,
            entity_id: None,
            details: None,
            origin: origin.clone(),
        }
    }

    pub fn on_entity(mut self, entity_type: &'static str, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Row to insert, with sensitive detail fields redacted.
    pub fn into_row(self) -> CreateActivityLog {
        CreateActivityLog {
            user_id: self.actor,
            action: self.action.to_string(),
            entity_type: self.entity_type.map(str::to_string),
            entity_id: self.entity_id,
            details: self
                .details
                .map(|d| redact_sensitive_fields(&d).to_string()),
            ip_address: self.origin.ip_address,
            user_agent: self.origin.user_agent,
        }
    }
}

/// Destination for activity entries.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    /// Record `entry`. Failures are logged, never returned.
    async fn record(&self, entry: ActivityEntry);
}

/// Sink writing to the `activity_logs` table.
pub struct DbActivitySink {
    pool: Option<DbPool>,
}

impl DbActivitySink {
    pub fn new(pool: Option<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivitySink for DbActivitySink {
    async fn record(&self, entry: ActivityEntry) {
        let Some(pool) = &self.pool else {
            tracing::warn!(action = entry.action, "Cannot record activity: database not available");
            return;
        };

        let action = entry.action;
        let actor = entry.actor;
        match ActivityLogRepo::create(pool, &entry.into_row()).await {
            Ok(row) => tracing::debug!(id = row.id, action, actor, "Activity recorded"),
            Err(e) => tracing::error!(error = %e, action, actor, "Failed to record activity"),
        }
    }
}
