//! Stored connection settings for the external session API.

use sqlx::FromRow;
use whaileys_core::types::{DbId, Timestamp};

/// A row from `api_config`. The token is never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct ApiConfig {
    pub id: DbId,
    pub api_url: String,
    pub api_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
