//! Activity log entity model and DTOs.
//!
//! Entries are append-only: there is no update DTO and no `updated_at`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use whaileys_core::types::{DbId, Timestamp};

/// A single activity log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: DbId,
    pub user_id: DbId,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// JSON-encoded details, stored as text.
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending an entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActivityLog {
    pub user_id: DbId,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Filter parameters for listing entries. `limit` is already clamped by the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogQuery {
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: i64,
}
