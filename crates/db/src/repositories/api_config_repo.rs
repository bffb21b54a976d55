//! Repository for the `api_config` table.

use sqlx::PgPool;

use crate::models::api_config::ApiConfig;

const COLUMNS: &str = "id, api_url, api_token, created_at, updated_at";

/// Read access to the stored external API settings.
pub struct ApiConfigRepo;

impl ApiConfigRepo {
    /// Most recently created configuration row, if any.
    pub async fn latest(pool: &PgPool) -> Result<Option<ApiConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_config ORDER BY id DESC LIMIT 1");
        sqlx::query_as::<_, ApiConfig>(&query)
            .fetch_optional(pool)
            .await
    }
}
