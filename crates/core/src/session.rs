//! WhatsApp session vocabulary.
//!
//! The external API owns session state; the backend only validates the
//! caller-chosen identifier and interprets the reported status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a session identifier (matches `activity_logs.entity_id`).
pub const MAX_SESSION_ID_LEN: usize = 255;

/// Connection status reported by the external session API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Connected,
    Connecting,
    Disconnected,
}

impl SessionStatus {
    /// Interpret a raw status string. Unknown values return `None`; callers
    /// keep the raw string around so nothing reported upstream is lost.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "connected" => Some(Self::Connected),
            "connecting" => Some(Self::Connecting),
            "disconnected" => Some(Self::Disconnected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
        }
    }

    /// Whether a QR code is expected to be available for pairing.
    pub fn awaits_pairing(self) -> bool {
        self == Self::Connecting
    }
}

/// Validate a caller-supplied session identifier.
///
/// Surrounding whitespace is trimmed. The result must be non-empty, at most
/// [`MAX_SESSION_ID_LEN`] characters and free of control characters.
/// Uniqueness is the external API's concern.
pub fn validate_session_id(raw: &str) -> Result<String, CoreError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(CoreError::Validation(
            "Digite um ID para a sessão".to_string(),
        ));
    }
    if id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(CoreError::Validation(format!(
            "O ID da sessão deve ter no máximo {MAX_SESSION_ID_LEN} caracteres"
        )));
    }
    if id.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "O ID da sessão contém caracteres inválidos".to_string(),
        ));
    }
    Ok(id.to_string())
}
