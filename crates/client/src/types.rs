//! Wire types exchanged with the external session API.
//!
//! Field names follow the upstream camelCase JSON and are passed through to
//! browsers unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use whaileys_core::session::SessionStatus;

/// A WhatsApp session as reported by the external API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Upstream row id; some deployments send it as a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Raw status string; see [`SessionRecord::known_status`].
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_connected: Option<String>,
}

impl SessionRecord {
    /// The status as a known variant, or `None` for values this build does
    /// not recognise.
    pub fn known_status(&self) -> Option<SessionStatus> {
        SessionStatus::parse(&self.status)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Int(n)) => n.to_string(),
        Some(RawId::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Response envelope used by every upstream endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Absent on some endpoints; only an explicit `false` marks a rejection.
    pub success: Option<bool>,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }

    /// Best human-readable reason carried by a failed envelope.
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Payload of `GET /api/sessions/{id}/qrcode`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodePayload {
    pub qr_code: Option<String>,
}
